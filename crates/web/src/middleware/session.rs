//! Session middleware configuration.
//!
//! Sessions only carry the identity the external provider handed us, so they
//! live in memory; a restart signs everyone out and the provider
//! re-establishes the session on the next visit.
//!
//! The store is a bounded `moka` cache: idle sessions age out after the
//! cookie's inactivity window and the total number of sessions is capped, so
//! a flood of sign-ins cannot grow memory without limit.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mp_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// In-memory session store with a capacity and an idle timeout.
#[derive(Debug, Clone)]
pub struct BoundedMemoryStore {
    records: Cache<Id, Record>,
}

impl BoundedMemoryStore {
    /// Create a store holding at most `max_sessions`, dropping any session
    /// not touched for `idle_timeout`.
    #[must_use]
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    /// Approximate number of stored sessions.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.records.entry_count()
    }

    /// Apply pending evictions now instead of on the next cache operation.
    pub async fn run_pending_tasks(&self) {
        self.records.run_pending_tasks().await;
    }
}

#[async_trait]
impl SessionStore for BoundedMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let record = self.records.get(session_id).await;
        match record {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => Ok(Some(record)),
            Some(_) => {
                self.records.invalidate(session_id).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer backed by a [`BoundedMemoryStore`].
#[must_use]
pub fn create_session_layer(config: &WebConfig) -> SessionManagerLayer<BoundedMemoryStore> {
    #[allow(clippy::cast_sign_loss)] // positive constant
    let idle_timeout = Duration::from_secs(SESSION_EXPIRY_SECONDS as u64);
    let store = BoundedMemoryStore::new(config.session_capacity, idle_timeout);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time::Duration as CookieDuration;

    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn record(expires_in: CookieDuration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = BoundedMemoryStore::new(10, DAY);
        let mut session = record(CookieDuration::hours(1));
        store.create(&mut session).await.unwrap();

        let loaded = store.load(&session.id).await.unwrap();
        assert_eq!(loaded.map(|r| r.id), Some(session.id));

        store.delete(&session.id).await.unwrap();
        assert!(store.load(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded_and_is_dropped() {
        let store = BoundedMemoryStore::new(10, DAY);
        let session = record(CookieDuration::minutes(-1));
        store.save(&session).await.unwrap();

        assert!(store.load(&session.id).await.unwrap().is_none());
        store.run_pending_tasks().await;
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let store = BoundedMemoryStore::new(5, DAY);
        for _ in 0..50 {
            let mut session = record(CookieDuration::hours(1));
            store.create(&mut session).await.unwrap();
        }

        store.run_pending_tasks().await;
        assert!(store.entry_count() <= 5, "{}", store.entry_count());
    }

    #[tokio::test]
    async fn test_idle_sessions_age_out() {
        let store = BoundedMemoryStore::new(10, Duration::from_millis(50));
        let session = record(CookieDuration::hours(1));
        store.save(&session).await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.load(&session.id).await.unwrap().is_none());
    }
}
