use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::clock::ManualClock;
use crate::domain::entities::{AccountStatus, Credential, Role};
use crate::errors::{AuthError, DomainError};
use crate::repositories::MockCredentialRepository;
use crate::services::session::{SessionChange, SessionStore};

async fn setup() -> (SessionStore, Arc<MockCredentialRepository>, Arc<ManualClock>, Uuid) {
    let repo = Arc::new(MockCredentialRepository::new());
    let clock = Arc::new(ManualClock::starting_now());
    let credential = Credential::new(
        "erin@example.com",
        Some("hash".to_string()),
        Role::User,
        AccountStatus::Active,
        Utc::now(),
    );
    let id = credential.id;
    repo.insert(credential).await;
    let store = SessionStore::new(repo.clone(), clock.clone(), 5, Duration::days(30));
    (store, repo, clock, id)
}

#[tokio::test]
async fn test_add_and_list() {
    let (store, _, clock, id) = setup().await;

    store.add_session(id, "token-a", "laptop").await.unwrap();
    clock.advance(Duration::seconds(1));
    store.add_session(id, "token-b", "phone").await.unwrap();

    let sessions = store.list_active(id).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].device, "laptop");
    assert_eq!(sessions[1].device, "phone");
}

#[tokio::test]
async fn test_cap_keeps_most_recent() {
    let (store, repo, clock, id) = setup().await;

    for i in 0..6 {
        store
            .add_session(id, &format!("token-{}", i), &format!("device-{}", i))
            .await
            .unwrap();
        clock.advance(Duration::seconds(1));
    }

    let stored = repo.get(id).await.unwrap();
    assert_eq!(stored.sessions.len(), 5);
    let devices: Vec<_> = store
        .list_active(id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.device)
        .collect();
    assert_eq!(devices, vec!["device-1", "device-2", "device-3", "device-4", "device-5"]);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let (store, _, _, id) = setup().await;
    store.add_session(id, "token-a", "laptop").await.unwrap();

    assert!(store.remove_session(id, "token-a").await.unwrap());
    assert!(!store.remove_session(id, "token-a").await.unwrap());
}

#[tokio::test]
async fn test_revoke_unknown_session() {
    let (store, _, _, id) = setup().await;

    let result = store.revoke_session(id, Uuid::new_v4()).await;
    assert_eq!(result.unwrap_err(), DomainError::Auth(AuthError::SessionNotFound));
}

#[tokio::test]
async fn test_list_hides_expired() {
    let (store, _, clock, id) = setup().await;
    store.add_session(id, "token-a", "laptop").await.unwrap();

    clock.advance(Duration::days(30));
    assert!(store.list_active(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_retries_after_conflict() {
    let (store, repo, _, id) = setup().await;
    repo.force_conflicts(2);

    store.add_session(id, "token-a", "laptop").await.unwrap();

    let stored = repo.get(id).await.unwrap();
    assert_eq!(stored.sessions.len(), 1);
}

#[tokio::test]
async fn test_gives_up_after_repeated_conflicts() {
    let (store, repo, _, id) = setup().await;
    repo.force_conflicts(3);

    let result = store.add_session(id, "token-a", "laptop").await;
    assert!(matches!(result, Err(DomainError::Storage { .. })));
    assert!(repo.get(id).await.unwrap().sessions.is_empty());
}

#[tokio::test]
async fn test_unchanged_skips_write() {
    let (store, repo, _, id) = setup().await;

    let value = store
        .modify(id, |_, _| Ok(SessionChange::Unchanged(7)))
        .await
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(repo.get(id).await.unwrap().version, 0);
}

#[tokio::test]
async fn test_missing_credential() {
    let (store, _, _, _) = setup().await;

    let result = store.clear_all(Uuid::new_v4()).await;
    assert_eq!(result.unwrap_err(), DomainError::Auth(AuthError::UserNotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_writers_do_not_lose_updates() {
    let (store, repo, _, id) = setup().await;
    let store = Arc::new(store);

    let mut handles = Vec::new();
    for i in 0..2 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .add_session(id, &format!("token-{}", i), &format!("device-{}", i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.get(id).await.unwrap().sessions.len(), 2);
}
