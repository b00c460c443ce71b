//! Replay tracking for single-use session tokens.
//!
//! A session token is immutable once issued, so enforcing the
//! "verify at most once" policy needs a marker outside the token: after
//! the first successful verification the token's session id is recorded
//! here, and later attempts with the same id are rejected. Hosts that
//! run multiple processes can provide their own [`ReplayStore`] backed
//! by shared storage; the bundled in-memory store covers the
//! single-process case.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Out-of-band marker store for consumed session tokens.
#[async_trait]
pub trait ReplayStore: Send + Sync {
    /// Whether the session id was already used for a successful
    /// verification.
    async fn is_used(&self, session_id: Uuid) -> bool;

    /// Atomically records a successful verification.
    ///
    /// Returns `true` when this call consumed the session id and
    /// `false` when it was already consumed. Check-then-mark must be a
    /// single operation: concurrent verifications of the same token
    /// race to this call, and exactly one may win. `expires_at` is the
    /// token's expiry; entries older than that are safe to drop.
    async fn try_mark_used(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> bool;
}

/// In-memory replay store. Expired entries are pruned on insert.
#[derive(Default)]
pub struct InMemoryReplayStore {
    used: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReplayStore for InMemoryReplayStore {
    async fn is_used(&self, session_id: Uuid) -> bool {
        let used = self.used.read().await;
        match used.get(&session_id) {
            Some(expires_at) => *expires_at > Utc::now(),
            None => false,
        }
    }

    async fn try_mark_used(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> bool {
        let mut used = self.used.write().await;
        let now = Utc::now();
        used.retain(|_, expiry| *expiry > now);
        if used.contains_key(&session_id) {
            return false;
        }
        used.insert(session_id, expires_at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn unused_session_is_not_flagged() {
        let store = InMemoryReplayStore::new();
        assert!(!store.is_used(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn first_mark_wins_and_flags_the_session() {
        let store = InMemoryReplayStore::new();
        let sid = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::minutes(5);

        assert!(store.try_mark_used(sid, expires_at).await);
        assert!(store.is_used(sid).await);
        assert!(!store.try_mark_used(sid, expires_at).await);
    }

    #[tokio::test]
    async fn concurrent_marks_admit_exactly_one_winner() {
        let store = std::sync::Arc::new(InMemoryReplayStore::new());
        let sid = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::minutes(5);

        let (a, b) = tokio::join!(
            store.try_mark_used(sid, expires_at),
            store.try_mark_used(sid, expires_at),
        );
        assert!(a ^ b);
    }

    #[tokio::test]
    async fn expired_entries_are_reusable_and_pruned() {
        let store = InMemoryReplayStore::new();
        let stale = Uuid::new_v4();

        assert!(store.try_mark_used(stale, Utc::now() - Duration::seconds(1)).await);
        assert!(!store.is_used(stale).await);

        // The stale entry is pruned, so the id can be consumed again.
        assert!(
            store
                .try_mark_used(stale, Utc::now() + Duration::minutes(5))
                .await
        );
    }
}
