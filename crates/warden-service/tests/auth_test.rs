//! Integration tests for registration, activation, login and logout.

mod helpers;

use chrono::Duration;

use helpers::{PASSWORD, TestApp, WRONG_PASSWORD};
use warden_core::error::ErrorKind;
use warden_core::types::id::{ActivationTokenId, SessionId};
use warden_database::FailPoint;
use warden_entity::user::{AccountState, Role, RoleSet};

#[tokio::test]
async fn test_register_creates_pending_account() {
    let app = TestApp::new();

    let registration = app
        .service
        .register(TestApp::register_request("  Grace@Example.com "))
        .await
        .expect("registration succeeds");

    assert_eq!(registration.email, "grace@example.com");
    assert_eq!(
        registration.activation_expires_at,
        helpers::start_time() + Duration::minutes(30)
    );

    let user = app
        .store
        .user_by_email("grace@example.com")
        .await
        .expect("user stored");
    assert_eq!(user.roles, RoleSet::registration_default());
    assert_eq!(user.state(), AccountState::Pending);
    assert_eq!(user.attempts, 0);
    assert_ne!(user.password_hash, PASSWORD);

    let tokens = app.store.activation_tokens_for(user.id).await;
    assert_eq!(tokens.len(), 1);
    assert!(!tokens[0].used);
    assert_eq!(app.notifier.sent(), vec![("grace@example.com".to_string(), tokens[0].id)]);
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register("dup@example.com").await;

    let err = app
        .service
        .register(TestApp::register_request("DUP@example.com"))
        .await
        .expect_err("second registration fails");

    assert_eq!(err.kind, ErrorKind::UserExists);
    assert_eq!(app.store.user_count().await, 1);
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_register_rolls_back_when_email_fails() {
    let app = TestApp::with_failing_notifier();

    let err = app
        .service
        .register(TestApp::register_request("nomail@example.com"))
        .await
        .expect_err("delivery failure aborts registration");

    assert_eq!(err.kind, ErrorKind::Notification);
    assert_eq!(app.store.user_count().await, 0);

    // The address is still free afterwards.
    assert!(app.store.user_by_email("nomail@example.com").await.is_none());
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_email() {
    let app = TestApp::new();

    let mut weak = TestApp::register_request("weak@example.com");
    weak.password = "password".to_string();
    let err = app.service.register(weak).await.expect_err("weak password");
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .service
        .register(TestApp::register_request("not-an-email"))
        .await
        .expect_err("malformed email");
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_register_with_unknown_role_name_is_rejected() {
    let app = TestApp::new();
    let mut req = TestApp::register_request("roles@example.com");
    req.roles = Some(vec!["read_activation_token".to_string(), "root".to_string()]);

    let err = app.service.register(req).await.expect_err("unknown role");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_register_with_caller_roles() {
    let app = TestApp::new();
    let mut req = TestApp::register_request("custom@example.com");
    req.roles = Some(vec!["create_session".to_string(), "read_session".to_string()]);

    let registration = app.service.register(req).await.expect("registration succeeds");

    let user = app
        .store
        .user_by_email("custom@example.com")
        .await
        .expect("user stored");
    assert_eq!(
        user.roles,
        RoleSet::from_roles([Role::CreateSession, Role::ReadSession])
    );
    assert_eq!(user.state(), AccountState::Active);

    // A token is still mailed, but the account cannot redeem it.
    let token = app.notifier.token_for("custom@example.com");
    assert_eq!(app.notifier.sent().len(), 1);
    let err = app
        .service
        .activate(token)
        .await
        .expect_err("no activation role");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert!(!app.store.activation_tokens_for(registration.user_id).await[0].used);

    app.service
        .login(TestApp::login_request("custom@example.com", PASSWORD))
        .await
        .expect("caller roles allow login");
}

#[tokio::test]
async fn test_activation_grants_session_roles_once() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com").await;
    let token = app.notifier.token_for("ada@example.com");

    app.service.activate(token).await.expect("first activation");

    let user = app.store.user_by_email("ada@example.com").await.expect("user");
    assert_eq!(user.state(), AccountState::Active);
    assert!(!user.roles.has(Role::ReadActivationToken));
    assert!(user.roles.contains(RoleSet::activation_grant()));
    assert!(app.store.activation_tokens_for(user_id).await[0].used);

    let err = app.service.activate(token).await.expect_err("token is spent");
    assert_eq!(err.kind, ErrorKind::TokenNotValid);
}

#[tokio::test]
async fn test_activation_after_expiry_changes_nothing() {
    let app = TestApp::new();
    app.register("late@example.com").await;
    let token = app.notifier.token_for("late@example.com");

    app.clock.advance(Duration::minutes(31));
    let err = app.service.activate(token).await.expect_err("expired");

    assert_eq!(err.kind, ErrorKind::TokenNotValid);
    let user = app.store.user_by_email("late@example.com").await.expect("user");
    assert_eq!(user.roles, RoleSet::registration_default());
}

#[tokio::test]
async fn test_activation_with_unknown_token() {
    let app = TestApp::new();
    let err = app
        .service
        .activate(ActivationTokenId::new())
        .await
        .expect_err("unknown token");
    assert_eq!(err.kind, ErrorKind::TokenNotValid);
}

#[tokio::test]
async fn test_activation_is_atomic() {
    let app = TestApp::new();
    let user_id = app.register("atomic@example.com").await;
    let token = app.notifier.token_for("atomic@example.com");

    app.store.inject_failure(FailPoint::MarkTokenUsed);
    let err = app.service.activate(token).await.expect_err("injected failure");
    assert_eq!(err.kind, ErrorKind::Database);

    // The role change was rolled back with the token update.
    let user = app.store.user_by_email("atomic@example.com").await.expect("user");
    assert_eq!(user.roles, RoleSet::registration_default());
    assert!(!app.store.activation_tokens_for(user_id).await[0].used);

    app.service.activate(token).await.expect("retry succeeds");
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = TestApp::new();
    let user_id = app.register_active("life@example.com").await;

    let session = app
        .login("LIFE@example.com", PASSWORD)
        .await
        .expect("login succeeds");

    assert_eq!(session.user_id, user_id);
    assert_eq!(session.email, "life@example.com");
    assert_eq!(session.first_name, "Grace");
    assert_eq!(session.created_at, helpers::start_time());
    assert_eq!(session.expires_at, helpers::start_time() + Duration::minutes(60));
    assert!(session.roles.contains(&"create_session".to_string()));

    let stored = app.store.sessions_for(user_id).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, session.session_id);
    assert_eq!(stored[0].ip_address, "203.0.113.7");
    assert_eq!(stored[0].user_agent, "integration-test/1.0");

    let claims = app
        .service
        .verify_session_token(&session.token)
        .await
        .expect("fresh token verifies");
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.sid, session.session_id);

    app.service.logout(session.session_id).await.expect("logout");
    assert!(app.store.sessions_for(user_id).await.is_empty());

    // Logging out twice is not an error.
    app.service.logout(session.session_id).await.expect("second logout");

    let err = app
        .service
        .verify_session_token(&session.token)
        .await
        .expect_err("session is gone");
    assert_eq!(err.kind, ErrorKind::TokenNotValid);
}

#[tokio::test]
async fn test_logout_unknown_session() {
    let app = TestApp::new();
    app.service
        .logout(SessionId::new())
        .await
        .expect("unknown session is fine");
}

#[tokio::test]
async fn test_session_token_expires_with_clock() {
    let app = TestApp::new();
    app.register_active("exp@example.com").await;
    let session = app.login("exp@example.com", PASSWORD).await.expect("login");

    app.clock.advance(Duration::minutes(61));
    let err = app
        .service
        .verify_session_token(&session.token)
        .await
        .expect_err("expired");
    assert_eq!(err.kind, ErrorKind::TokenNotValid);
}

#[tokio::test]
async fn test_login_before_activation_is_denied() {
    let app = TestApp::new();
    let user_id = app.register("pending@example.com").await;

    let err = app
        .login("pending@example.com", PASSWORD)
        .await
        .expect_err("pending account");

    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert!(app.store.sessions_for(user_id).await.is_empty());
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = TestApp::new();
    let err = app
        .login("ghost@example.com", PASSWORD)
        .await
        .expect_err("no such user");
    assert_eq!(err.kind, ErrorKind::UserNotExists);
}

#[tokio::test]
async fn test_login_rolls_back_session_on_failure() {
    let app = TestApp::new();
    let user_id = app.register_active("flaky@example.com").await;
    app.login("flaky@example.com", WRONG_PASSWORD)
        .await
        .expect_err("wrong password");

    app.store.inject_failure(FailPoint::Commit);
    let err = app
        .login("flaky@example.com", PASSWORD)
        .await
        .expect_err("commit fails");
    assert_eq!(err.kind, ErrorKind::Database);

    assert!(app.store.sessions_for(user_id).await.is_empty());
    let user = app.store.user_by_email("flaky@example.com").await.expect("user");
    assert_eq!(user.attempts, 1);
}

#[tokio::test]
async fn test_login_steps() {
    let app = TestApp::new();
    app.register_active("steps@example.com").await;

    let steps = app
        .service
        .login_steps("steps@example.com")
        .await
        .expect("steps");
    assert!(steps.requires_password);
    assert!(!steps.requires_otp);

    let unknown = app
        .service
        .login_steps("nobody@example.com")
        .await
        .expect("unknown email answers too");
    assert_eq!(unknown, steps);
}
