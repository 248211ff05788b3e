//! Login, signup, and session lifecycle.

use tracing::info;

use api::schema::{LoginRequest, SignupRequest};
use api::{AuthSession, Backend, SessionHandle};
use lms_core::model::{Role, User};

use crate::error::ServiceError;

/// Front door for authentication. Owns nothing beyond the shared session
/// handle; a successful login installs credentials there and every
/// subsequent request picks them up.
#[derive(Clone)]
pub struct AuthService {
    backend: Backend,
    session: SessionHandle,
}

impl AuthService {
    #[must_use]
    pub fn new(backend: Backend, session: SessionHandle) -> Self {
        Self { backend, session }
    }

    /// Exchanges credentials for a session and installs it.
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection; no session is installed on
    /// failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let request = LoginRequest {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        };
        let outcome = self.backend.auth.login(&request).await?;
        info!(role = %outcome.user.role(), "signed in");
        self.session
            .install(AuthSession::new(outcome.access_token, outcome.user.clone()));
        Ok(outcome.user)
    }

    /// Registers an account. Does not sign the new user in; the caller
    /// routes them to the login screen.
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection (duplicate email, weak input).
    pub async fn signup(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ServiceError> {
        let request = SignupRequest {
            email: email.trim().to_owned(),
            full_name: full_name.trim().to_owned(),
            password: password.to_owned(),
            role,
        };
        Ok(self.backend.auth.signup(&request).await?)
    }

    /// Explicit logout; clears credentials without running forced-logout
    /// hooks.
    pub fn logout(&self) {
        info!("signed out");
        self.session.clear();
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    /// Role of the signed-in user, for route gating.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }
}
