//! Explicit session context for authenticated requests.
//!
//! Login installs an `AuthSession`, logout clears it; the HTTP client reads
//! the bearer token from here on every request. There is no ambient global
//! state — whoever constructs the client decides which handle it shares.

use std::sync::{Arc, Mutex, PoisonError};

use lms_core::model::{Role, User};

/// Credentials plus identity for the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    token: String,
    user: User,
}

impl AuthSession {
    #[must_use]
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }
}

type LogoutHook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct SessionInner {
    current: Mutex<Option<AuthSession>>,
    forced_logout_hooks: Mutex<Vec<LogoutHook>>,
}

/// Shared, cloneable handle to the tab's session state.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh session, replacing any previous one.
    pub fn install(&self, session: AuthSession) {
        *self.lock_current() = Some(session);
    }

    /// Tears the session down (explicit logout).
    pub fn clear(&self) {
        *self.lock_current() = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.lock_current().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock_current().as_ref().map(|s| s.user().clone())
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.lock_current().as_ref().map(|s| s.user().role())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }

    /// Token to attach to outgoing requests.
    ///
    /// Empty and literal-`"null"` tokens are treated as absent; the latter
    /// shows up when a browser storage layer stringified a missing value.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.lock_current()
            .as_ref()
            .map(|s| s.token().trim().to_owned())
            .filter(|token| !token.is_empty() && token != "null")
    }

    /// Registers a hook that runs whenever the session is forcibly ended by
    /// a 401 response. The UI layer uses this to navigate to the login
    /// screen, regardless of which call tripped it.
    pub fn on_forced_logout(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner
            .forced_logout_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    /// Clears credentials and runs every forced-logout hook.
    pub fn force_logout(&self) {
        self.clear();
        let hooks = self
            .inner
            .forced_logout_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for hook in hooks.iter() {
            hook();
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<AuthSession>> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::model::UserId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn learner() -> User {
        User::new(
            UserId::random(),
            "learner@example.com",
            "Test Learner",
            Role::Learner,
            true,
            None,
        )
        .unwrap()
    }

    #[test]
    fn install_and_clear_roundtrip() {
        let handle = SessionHandle::new();
        assert!(!handle.is_authenticated());

        handle.install(AuthSession::new("tok-123", learner()));
        assert!(handle.is_authenticated());
        assert_eq!(handle.bearer_token().as_deref(), Some("tok-123"));
        assert_eq!(handle.role(), Some(Role::Learner));

        handle.clear();
        assert!(handle.current().is_none());
    }

    #[test]
    fn blank_and_null_tokens_are_absent() {
        let handle = SessionHandle::new();
        handle.install(AuthSession::new("  ", learner()));
        assert_eq!(handle.bearer_token(), None);

        handle.install(AuthSession::new("null", learner()));
        assert_eq!(handle.bearer_token(), None);
        assert!(!handle.is_authenticated());
    }

    #[test]
    fn force_logout_clears_and_notifies() {
        let handle = SessionHandle::new();
        handle.install(AuthSession::new("tok", learner()));

        let fired = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&fired);
        handle.on_forced_logout(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        handle.force_logout();
        assert!(handle.current().is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_state() {
        let handle = SessionHandle::new();
        let other = handle.clone();
        handle.install(AuthSession::new("tok", learner()));
        assert!(other.is_authenticated());
    }
}
