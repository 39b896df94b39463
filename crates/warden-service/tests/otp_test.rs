//! Integration tests for second-factor enrollment and enforcement.

mod helpers;

use chrono::Duration;

use helpers::{PASSWORD, TestApp};
use warden_core::error::ErrorKind;
use warden_core::traits::Clock;
use warden_entity::user::Role;

fn login_with_code(email: &str, code: Option<String>) -> warden_service::LoginRequest {
    let mut req = TestApp::login_request(email, PASSWORD);
    req.otp = code;
    req
}

#[tokio::test]
async fn test_otp_is_enforced_only_after_confirmation() {
    let app = TestApp::new();
    let user_id = app.register_active("otp@example.com").await;

    let enrollment = app
        .service
        .configure_otp(user_id)
        .await
        .expect("configure");
    assert!(enrollment.provisioning_url.starts_with("otpauth://totp/"));

    let user = app.store.user_by_email("otp@example.com").await.expect("user");
    assert!(user.roles.has(Role::OtpEnabled));
    assert!(!user.roles.has(Role::OtpConfigured));
    assert_eq!(user.otp_secret.as_deref(), Some(enrollment.secret.as_str()));

    // Enabled but unconfirmed: password alone still works.
    app.login("otp@example.com", PASSWORD)
        .await
        .expect("unconfirmed factor is not enforced");

    let code = app
        .otp
        .code_at(&enrollment.secret, app.clock.now())
        .expect("code");
    app.service
        .confirm_otp(user_id, &code)
        .await
        .expect("confirm");

    let steps = app
        .service
        .login_steps("otp@example.com")
        .await
        .expect("steps");
    assert!(steps.requires_otp);

    let err = app
        .login("otp@example.com", PASSWORD)
        .await
        .expect_err("code required");
    assert_eq!(err.kind, ErrorKind::OtpTokenInvalid);

    let err = app
        .service
        .login(login_with_code("otp@example.com", Some("12345".to_string())))
        .await
        .expect_err("malformed code");
    assert_eq!(err.kind, ErrorKind::OtpTokenInvalid);

    // OTP refusals do not count as password failures.
    let user = app.store.user_by_email("otp@example.com").await.expect("user");
    assert_eq!(user.attempts, 0);

    app.clock.advance(Duration::minutes(2));
    let code = app
        .otp
        .code_at(&enrollment.secret, app.clock.now())
        .expect("code");
    let session = app
        .service
        .login(login_with_code("otp@example.com", Some(code)))
        .await
        .expect("password and code");
    assert!(session.roles.contains(&"otp_configured".to_string()));
}

#[tokio::test]
async fn test_confirm_with_stale_code_is_rejected() {
    let app = TestApp::new();
    let user_id = app.register_active("stale@example.com").await;
    let enrollment = app.service.configure_otp(user_id).await.expect("configure");

    let code = app
        .otp
        .code_at(&enrollment.secret, app.clock.now())
        .expect("code");
    app.clock.advance(Duration::minutes(10));

    let err = app
        .service
        .confirm_otp(user_id, &code)
        .await
        .expect_err("stale code");
    assert_eq!(err.kind, ErrorKind::OtpTokenInvalid);

    let user = app.store.user_by_email("stale@example.com").await.expect("user");
    assert!(!user.roles.has(Role::OtpConfigured));
}

#[tokio::test]
async fn test_confirm_without_configure_is_denied() {
    let app = TestApp::new();
    let user_id = app.register_active("noconf@example.com").await;

    let err = app
        .service
        .confirm_otp(user_id, "123456")
        .await
        .expect_err("nothing to confirm");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    let err = app
        .service
        .otp_provisioning_url(user_id)
        .await
        .expect_err("no secret yet");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_pending_account_cannot_configure_otp() {
    let app = TestApp::new();
    let user_id = app.register("early@example.com").await;

    let err = app
        .service
        .configure_otp(user_id)
        .await
        .expect_err("pending account");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_provisioning_url_matches_enrollment() {
    let app = TestApp::new();
    let user_id = app.register_active("url@example.com").await;
    let enrollment = app.service.configure_otp(user_id).await.expect("configure");

    let url = app
        .service
        .otp_provisioning_url(user_id)
        .await
        .expect("url");
    assert_eq!(url, enrollment.provisioning_url);
}

#[tokio::test]
async fn test_disable_otp_restores_password_only_login() {
    let app = TestApp::new();
    let user_id = app.register_active("off@example.com").await;
    let enrollment = app.service.configure_otp(user_id).await.expect("configure");
    let code = app
        .otp
        .code_at(&enrollment.secret, app.clock.now())
        .expect("code");
    app.service.confirm_otp(user_id, &code).await.expect("confirm");

    app.service.disable_otp(user_id).await.expect("disable");

    let user = app.store.user_by_email("off@example.com").await.expect("user");
    assert!(!user.roles.has(Role::OtpEnabled));
    assert!(!user.roles.has(Role::OtpConfigured));
    assert!(user.otp_secret.is_none());

    app.login("off@example.com", PASSWORD)
        .await
        .expect("password alone");
}
