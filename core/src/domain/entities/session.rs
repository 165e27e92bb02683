//! Refresh-token sessions owned by a credential

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Default cap on concurrent sessions per credential
pub const MAX_SESSIONS: usize = 5;

/// SHA-256 hex digest of a refresh token. Only the digest is ever stored.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// One outstanding refresh token, representing one logged-in device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier used to revoke the session without knowing the token
    pub id: Uuid,
    pub token_hash: String,
    pub device: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(refresh_token: &str, device: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash: hash_refresh_token(refresh_token),
            device: device.to_string(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    fn matches(&self, token_hash: &str) -> bool {
        constant_time_eq(self.token_hash.as_bytes(), token_hash.as_bytes())
    }
}

/// Bounded list of a credential's sessions
///
/// Expired entries are never purged here; they are filtered out on read and
/// fall off the list through normal eviction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionList(Vec<Session>);

impl SessionList {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self(sessions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Session> {
        self.0.get(index)
    }

    /// Appends a session, then evicts the oldest by `issued_at` until at most
    /// `max` remain
    pub fn add(&mut self, session: Session, max: usize) {
        self.0.push(session);
        let max = max.max(1);
        while self.0.len() > max {
            let oldest = self
                .0
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| s.issued_at)
                .map(|(i, _)| i);
            match oldest {
                Some(index) => {
                    self.0.remove(index);
                }
                None => break,
            }
        }
    }

    /// Index of the live session holding `refresh_token`
    pub fn find(&self, refresh_token: &str, now: DateTime<Utc>) -> Option<usize> {
        let token_hash = hash_refresh_token(refresh_token);
        self.0
            .iter()
            .position(|s| s.matches(&token_hash) && !s.is_expired(now))
    }

    /// Rotates the session at `index` in place. The session id survives; the
    /// token, device and both timestamps are replaced.
    pub fn replace(
        &mut self,
        index: usize,
        new_refresh_token: &str,
        device: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> bool {
        match self.0.get_mut(index) {
            Some(session) => {
                session.token_hash = hash_refresh_token(new_refresh_token);
                session.device = device.to_string();
                session.issued_at = now;
                session.expires_at = now + ttl;
                true
            }
            None => false,
        }
    }

    /// Drops the session holding `refresh_token`; returns whether one was removed
    pub fn remove_by_token(&mut self, refresh_token: &str) -> bool {
        let token_hash = hash_refresh_token(refresh_token);
        let before = self.0.len();
        self.0.retain(|s| !s.matches(&token_hash));
        self.0.len() != before
    }

    pub fn remove_by_id(&mut self, id: Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|s| s.id != id);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Non-expired sessions, oldest first
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Session> {
        let mut live: Vec<Session> = self
            .0
            .iter()
            .filter(|s| !s.is_expired(now))
            .cloned()
            .collect();
        live.sort_by_key(|s| s.issued_at);
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::days(30)
    }

    #[test]
    fn test_hash_is_stable_and_not_raw() {
        let hash = hash_refresh_token("token-a");
        assert_eq!(hash, hash_refresh_token("token-a"));
        assert_ne!(hash, "token-a");
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_add_evicts_oldest() {
        let start = Utc::now();
        let mut list = SessionList::default();
        for i in 0..6 {
            let now = start + Duration::seconds(i);
            let session = Session::new(&format!("t{}", i), &format!("d{}", i), now, ttl());
            list.add(session, MAX_SESSIONS);
        }

        assert_eq!(list.len(), 5);
        let now = start + Duration::seconds(10);
        assert!(list.find("t0", now).is_none());
        for i in 1..6 {
            assert!(list.find(&format!("t{}", i), now).is_some());
        }
    }

    #[test]
    fn test_find_ignores_expired() {
        let now = Utc::now();
        let mut list = SessionList::default();
        list.add(Session::new("t", "d", now, Duration::hours(1)), MAX_SESSIONS);

        assert_eq!(list.find("t", now), Some(0));
        assert!(list.find("t", now + Duration::hours(1)).is_none());
        assert!(list.find("other", now).is_none());
        assert!(list.active(now + Duration::hours(2)).is_empty());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_replace_rotates_in_place() {
        let now = Utc::now();
        let mut list = SessionList::default();
        list.add(Session::new("old", "phone", now, ttl()), MAX_SESSIONS);
        let id = list.iter().next().unwrap().id;

        let later = now + Duration::minutes(5);
        assert!(list.replace(0, "new", "phone", later, ttl()));

        assert!(list.find("old", later).is_none());
        assert_eq!(list.find("new", later), Some(0));
        let session = list.iter().next().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.issued_at, later);
        assert_eq!(session.expires_at, later + ttl());
        assert!(!list.replace(3, "x", "y", later, ttl()));
    }

    #[test]
    fn test_remove() {
        let now = Utc::now();
        let mut list = SessionList::default();
        list.add(Session::new("a", "d1", now, ttl()), MAX_SESSIONS);
        list.add(Session::new("b", "d2", now, ttl()), MAX_SESSIONS);
        let b_id = list.iter().nth(1).unwrap().id;

        assert!(list.remove_by_token("a"));
        assert!(!list.remove_by_token("a"));
        assert!(list.remove_by_id(b_id));
        assert!(list.is_empty());
    }

    #[test]
    fn test_serializes_as_array() {
        let list = SessionList::default();
        assert_eq!(serde_json::to_string(&list).unwrap(), "[]");
    }
}
