//! Session lifecycle against the in-memory backend.

use api::{Backend, InMemoryBackend, SessionHandle};
use lms_core::model::{Role, User, UserId};
use lms_core::time::{fixed_clock, fixed_now};
use services::AuthService;

fn service_with_user() -> (AuthService, SessionHandle) {
    let double = InMemoryBackend::new().with_clock(fixed_clock());
    double.seed_user(
        User::new(
            UserId::random(),
            "ada@example.com",
            "Ada Lovelace",
            Role::Admin,
            true,
            Some(fixed_now()),
        )
        .unwrap(),
        "hunter2",
    );
    let session = SessionHandle::new();
    let auth = AuthService::new(Backend::from_double(double), session.clone());
    (auth, session)
}

#[tokio::test]
async fn login_installs_the_session() {
    let (auth, session) = service_with_user();
    assert!(!auth.is_authenticated());

    let user = auth.login(" ada@example.com ", "hunter2").await.unwrap();
    assert_eq!(user.email(), "ada@example.com");
    assert!(auth.is_authenticated());
    assert_eq!(session.role(), Some(Role::Admin));
    assert!(session.bearer_token().is_some());
}

#[tokio::test]
async fn rejected_login_leaves_no_session() {
    let (auth, session) = service_with_user();
    assert!(auth.login("ada@example.com", "wrong").await.is_err());
    assert!(!auth.is_authenticated());
    assert!(session.current().is_none());
}

#[tokio::test]
async fn logout_clears_credentials() {
    let (auth, session) = service_with_user();
    auth.login("ada@example.com", "hunter2").await.unwrap();
    auth.logout();
    assert!(!auth.is_authenticated());
    assert!(session.current().is_none());
}

#[tokio::test]
async fn signup_then_login_round_trip() {
    let (auth, _session) = service_with_user();
    let created = auth
        .signup("grace@example.com", "Grace Hopper", "enigma", Role::Learner)
        .await
        .unwrap();
    assert_eq!(created.role(), Role::Learner);

    // Signup does not sign in; an explicit login does.
    assert!(!auth.is_authenticated());
    let user = auth.login("grace@example.com", "enigma").await.unwrap();
    assert_eq!(user.id(), created.id());
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let (auth, _session) = service_with_user();
    let err = auth
        .signup("ada@example.com", "Imposter", "pw", Role::Learner)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already registered"));
}
