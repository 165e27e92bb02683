//! Unit tests for authentication service

use chrono::Duration;

use crate::clock::Clock;
use crate::domain::entities::{AccountStatus, Role};
use crate::domain::value_objects::Identity;
use crate::errors::{AuthError, DomainError};
use crate::services::auth::{AuthServiceConfig, EmailMessage};

use super::mocks::*;

const EMAIL: &str = "frank@example.com";

async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

fn auth_err(result: Result<impl std::fmt::Debug, DomainError>) -> AuthError {
    match result {
        Err(DomainError::Auth(e)) => e,
        other => panic!("expected auth error, got {:?}", other),
    }
}

async fn identity(ctx: &TestContext, id: uuid::Uuid) -> Identity {
    Identity::from(&ctx.repo.get(id).await.unwrap())
}

#[tokio::test]
async fn test_register_defaults_to_active() {
    let ctx = TestContext::new();

    let credential = ctx.service.register("New@Example.com", PASSWORD).await.unwrap();
    assert_eq!(credential.email, "new@example.com");
    assert_eq!(credential.status, AccountStatus::Active);
    assert_eq!(credential.role, Role::User);
    assert_ne!(credential.password_hash.as_deref(), Some(PASSWORD));

    settle().await;
    assert_eq!(
        ctx.email.sent(),
        vec![EmailMessage::Welcome {
            to: "new@example.com".to_string(),
            pending_verification: false,
        }]
    );
}

#[tokio::test]
async fn test_register_pending_when_verification_required() {
    let ctx = TestContext::with_config(AuthServiceConfig {
        require_email_verification: true,
        min_failure_latency_ms: 0,
        ..AuthServiceConfig::default()
    });

    let credential = ctx.service.register(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(credential.status, AccountStatus::Pending);

    let err = auth_err(ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await);
    assert_eq!(err, AuthError::EmailNotVerified);

    ctx.service.activate(credential.id).await.unwrap();
    assert!(ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.is_ok());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new();
    ctx.service.register(EMAIL, PASSWORD).await.unwrap();

    let err = auth_err(ctx.service.register("FRANK@example.com", "other").await);
    assert_eq!(err, AuthError::EmailAlreadyRegistered);
}

#[tokio::test]
async fn test_login_success() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;

    let pair = ctx
        .service
        .login("Frank@Example.com", PASSWORD, "laptop", "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(pair.access_expires_in, 24 * 3600);

    let stored = ctx.repo.get(id).await.unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(stored.lock_until.is_none());
    assert_eq!(stored.sessions.len(), 1);
    assert_eq!(stored.last_login_origin.as_deref(), Some("10.0.0.1"));
    // Only the digest is stored
    assert!(stored.sessions.iter().all(|s| s.token_hash != pair.refresh_token));
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let ctx = TestContext::new();
    ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;

    let unknown = ctx
        .service
        .login("nobody@example.com", PASSWORD, "laptop", "127.0.0.1")
        .await
        .unwrap_err();
    let wrong = ctx
        .service
        .login(EMAIL, "wrong", "laptop", "127.0.0.1")
        .await
        .unwrap_err();

    assert_eq!(unknown, wrong);
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown, DomainError::Auth(AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_lockout_scenario() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;

    ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.unwrap();

    for _ in 0..4 {
        let err = auth_err(ctx.service.login(EMAIL, "wrong", "laptop", "127.0.0.1").await);
        assert_eq!(err, AuthError::InvalidCredentials);
    }
    let stored = ctx.repo.get(id).await.unwrap();
    assert_eq!(stored.failed_login_attempts, 4);
    assert!(stored.lock_until.is_none());

    let err = auth_err(ctx.service.login(EMAIL, "wrong", "laptop", "127.0.0.1").await);
    assert_eq!(err, AuthError::AccountLocked);
    let stored = ctx.repo.get(id).await.unwrap();
    assert_eq!(stored.failed_login_attempts, 5);
    assert_eq!(stored.lock_until, Some(ctx.clock.now() + Duration::hours(2)));

    // Lock wins over a correct password
    let err = auth_err(ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await);
    assert_eq!(err, AuthError::AccountLocked);

    settle().await;
    assert!(ctx.email.sent().contains(&EmailMessage::AccountLocked {
        to: EMAIL.to_string()
    }));

    // Self-heals after two hours
    ctx.clock.advance(Duration::hours(2));
    ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.unwrap();
    let stored = ctx.repo.get(id).await.unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(stored.lock_until.is_none());
}

#[tokio::test]
async fn test_inactive_status_checked_after_password() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Blocked).await;

    let err = auth_err(ctx.service.login(EMAIL, "wrong", "laptop", "127.0.0.1").await);
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(ctx.repo.get(id).await.unwrap().failed_login_attempts, 1);

    let err = auth_err(ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await);
    assert_eq!(err, AuthError::AccountInactive);
}

#[tokio::test]
async fn test_storage_failure_is_not_invalid_credentials() {
    let ctx = TestContext::new();
    ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    ctx.repo.set_fail_reads(true);

    let result = ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await;
    assert!(matches!(result, Err(DomainError::Storage { .. })));
}

#[tokio::test]
async fn test_refresh_rotates_and_invalidates_predecessor() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    let pair = ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.unwrap();
    let session_id = ctx.repo.get(id).await.unwrap().sessions.iter().next().unwrap().id;

    ctx.clock.advance(Duration::minutes(1));
    let rotated = ctx.service.refresh(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    let err = auth_err(ctx.service.refresh(&pair.refresh_token).await);
    assert_eq!(err, AuthError::InvalidRefreshToken);

    let stored = ctx.repo.get(id).await.unwrap();
    assert_eq!(stored.sessions.len(), 1);
    let session = stored.sessions.iter().next().unwrap();
    assert_eq!(session.id, session_id);
    assert_eq!(session.device, "laptop");

    assert!(ctx.service.refresh(&rotated.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rejects_access_token_and_garbage() {
    let ctx = TestContext::new();
    ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    let pair = ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.unwrap();

    let err = auth_err(ctx.service.refresh(&pair.access_token).await);
    assert_eq!(err, AuthError::InvalidRefreshToken);
    let err = auth_err(ctx.service.refresh("garbage").await);
    assert_eq!(err, AuthError::InvalidRefreshToken);
}

#[tokio::test]
async fn test_refresh_after_session_expiry() {
    let ctx = TestContext::new();
    ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    let pair = ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.unwrap();

    ctx.clock.advance(Duration::days(30));
    let err = auth_err(ctx.service.refresh(&pair.refresh_token).await);
    assert_eq!(err, AuthError::InvalidRefreshToken);
}

#[tokio::test]
async fn test_refresh_for_blocked_account() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    let pair = ctx.service.login(EMAIL, PASSWORD, "laptop", "127.0.0.1").await.unwrap();

    ctx.service.block(id).await.unwrap();

    // Blocking clears sessions, so the token no longer matches anything
    let err = auth_err(ctx.service.refresh(&pair.refresh_token).await);
    assert_eq!(err, AuthError::InvalidRefreshToken);
}

#[tokio::test]
async fn test_session_cap_keeps_latest_five() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;

    let mut pairs = Vec::new();
    for i in 0..6 {
        pairs.push(
            ctx.service
                .login(EMAIL, PASSWORD, &format!("device-{}", i), "127.0.0.1")
                .await
                .unwrap(),
        );
        ctx.clock.advance(Duration::seconds(1));
    }

    let sessions = ctx.service.list_sessions(&identity(&ctx, id).await).await.unwrap();
    let devices: Vec<_> = sessions.iter().map(|s| s.device.as_str()).collect();
    assert_eq!(devices, vec!["device-1", "device-2", "device-3", "device-4", "device-5"]);

    let err = auth_err(ctx.service.refresh(&pairs[0].refresh_token).await);
    assert_eq!(err, AuthError::InvalidRefreshToken);
}

#[tokio::test]
async fn test_logout_is_idempotent_and_scoped() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    let device_a = ctx.service.login(EMAIL, PASSWORD, "device-a", "127.0.0.1").await.unwrap();
    let device_b = ctx.service.login(EMAIL, PASSWORD, "device-b", "127.0.0.1").await.unwrap();
    let who = identity(&ctx, id).await;

    assert_eq!(ctx.service.list_sessions(&who).await.unwrap().len(), 2);

    ctx.service.logout(&who, Some(&device_a.refresh_token)).await.unwrap();
    ctx.service.logout(&who, Some(&device_a.refresh_token)).await.unwrap();
    ctx.service.logout(&who, None).await.unwrap();

    let sessions = ctx.service.list_sessions(&who).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].device, "device-b");
    assert!(ctx.service.refresh(&device_b.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_logout_all_and_revoke() {
    let ctx = TestContext::new();
    let id = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    ctx.service.login(EMAIL, PASSWORD, "device-a", "127.0.0.1").await.unwrap();
    ctx.service.login(EMAIL, PASSWORD, "device-b", "127.0.0.1").await.unwrap();
    let who = identity(&ctx, id).await;

    let first = ctx.service.list_sessions(&who).await.unwrap()[0].id;
    ctx.service.revoke_session(&who, first).await.unwrap();
    let err = auth_err(ctx.service.revoke_session(&who, first).await);
    assert_eq!(err, AuthError::SessionNotFound);

    assert_eq!(ctx.service.logout_all(&who).await.unwrap(), 1);
    assert_eq!(ctx.service.logout_all(&who).await.unwrap(), 0);
    assert!(ctx.service.list_sessions(&who).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_status_transitions() {
    let ctx = TestContext::new();
    let active = ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;
    let pending = ctx
        .seed("pending@example.com", Role::User, AccountStatus::Pending)
        .await;

    assert_eq!(ctx.service.block(active).await.unwrap(), AccountStatus::Blocked);
    let err = auth_err(ctx.service.block(active).await);
    assert!(matches!(err, AuthError::InvalidStatusTransition { .. }));
    assert_eq!(ctx.service.unblock(active).await.unwrap(), AccountStatus::Active);

    let err = auth_err(ctx.service.block(pending).await);
    assert!(matches!(err, AuthError::InvalidStatusTransition { .. }));

    let err = auth_err(ctx.service.block(uuid::Uuid::new_v4()).await);
    assert_eq!(err, AuthError::UserNotFound);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_padded_to_latency_floor() {
    let ctx = TestContext::with_config(AuthServiceConfig {
        min_failure_latency_ms: 250,
        ..AuthServiceConfig::default()
    });
    ctx.seed(EMAIL, Role::User, AccountStatus::Active).await;

    let started = tokio::time::Instant::now();
    let _ = ctx.service.login("nobody@example.com", PASSWORD, "laptop", "127.0.0.1").await;
    assert!(started.elapsed() >= std::time::Duration::from_millis(250));

    let started = tokio::time::Instant::now();
    let _ = ctx.service.login(EMAIL, "wrong", "laptop", "127.0.0.1").await;
    assert!(started.elapsed() >= std::time::Duration::from_millis(250));
}
