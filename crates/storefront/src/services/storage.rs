//! Per-visitor key/value storage for cart snapshots.
//!
//! Snapshots live outside the session record: the session only carries the
//! visitor ID, while [`SnapshotCache`] holds one slot per visitor. Every write
//! goes through [`SnapshotStore::update`], which reads and replaces a value
//! under the visitor's lock, so concurrent requests from the same visitor
//! never overwrite each other's changes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tokio::sync::Mutex;

/// Upper bound on visitors kept in memory at once.
const MAX_VISITORS: u64 = 100_000;

/// Errors reading or writing persisted snapshots.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Session backend failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Snapshot could not be encoded.
    #[error("snapshot encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key/value store scoped to one visitor.
pub trait SnapshotStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Atomically replace the value under `key`.
    ///
    /// `f` receives the current value and returns the new value plus a result
    /// handed back to the caller. If `f` fails, nothing is written.
    fn update<F, R>(&self, key: &str, f: F) -> impl Future<Output = Result<R, StorageError>> + Send
    where
        F: FnOnce(Option<&str>) -> Result<(String, R), StorageError> + Send,
        R: Send;
}

type Slot = Arc<Mutex<HashMap<String, String>>>;

/// Snapshot slots for every visitor, evicted after a period of inactivity.
///
/// Cheap to clone; clones share the same slots.
#[derive(Clone)]
pub struct SnapshotCache {
    slots: Cache<String, Slot>,
}

impl SnapshotCache {
    /// Create a cache that forgets a visitor after `idle_ttl` without access.
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            slots: Cache::builder()
                .max_capacity(MAX_VISITORS)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }

    /// The store belonging to `visitor`, created empty on first use.
    pub async fn for_visitor(&self, visitor: &str) -> VisitorSnapshots {
        let slot = self
            .slots
            .get_with(visitor.to_owned(), async { Slot::default() })
            .await;
        VisitorSnapshots { slot }
    }
}

/// One visitor's snapshots.
#[derive(Clone)]
pub struct VisitorSnapshots {
    slot: Slot,
}

impl SnapshotStore for VisitorSnapshots {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().await.get(key).cloned())
    }

    async fn update<F, R>(&self, key: &str, f: F) -> Result<R, StorageError>
    where
        F: FnOnce(Option<&str>) -> Result<(String, R), StorageError> + Send,
        R: Send,
    {
        let mut entries = self.slot.lock().await;
        let (value, result) = f(entries.get(key).map(String::as_str))?;
        entries.insert(key.to_owned(), value);
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(value: &str) -> impl FnOnce(Option<&str>) -> Result<(String, ()), StorageError> {
        let value = value.to_owned();
        move |_: Option<&str>| Ok((value, ()))
    }

    #[tokio::test]
    async fn test_visitor_snapshots_round_trip() {
        let store = SnapshotCache::new(Duration::from_secs(60))
            .for_visitor("a")
            .await;
        assert_eq!(store.load("cart").await.unwrap(), None);

        store.update("cart", write("[]")).await.unwrap();
        assert_eq!(store.load("cart").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_visitors_are_isolated() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache
            .for_visitor("a")
            .await
            .update("cart", write("[1]"))
            .await
            .unwrap();

        let other = cache.for_visitor("b").await;
        assert_eq!(other.load("cart").await.unwrap(), None);

        let again = cache.for_visitor("a").await;
        assert_eq!(again.load("cart").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_update_sees_previous_value() {
        let store = SnapshotCache::new(Duration::from_secs(60))
            .for_visitor("a")
            .await;
        store.update("n", write("1")).await.unwrap();

        let previous = store
            .update("n", |current| Ok(("2".to_string(), current.map(str::to_owned))))
            .await
            .unwrap();

        assert_eq!(previous.as_deref(), Some("1"));
        assert_eq!(store.load("n").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let store = SnapshotCache::new(Duration::from_secs(60))
            .for_visitor("a")
            .await;
        store.update("cart", write("[]")).await.unwrap();

        let result: Result<(), _> = store
            .update("cart", |_| {
                Err(StorageError::from(
                    serde_json::from_str::<u8>("x").unwrap_err(),
                ))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.load("cart").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() {
        let store = SnapshotCache::new(Duration::from_secs(60))
            .for_visitor("a")
            .await;

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update("n", |current| {
                            let n: u32 = current.map_or(0, |v| v.parse().unwrap());
                            Ok(((n + 1).to_string(), ()))
                        })
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.load("n").await.unwrap().as_deref(), Some("50"));
    }
}
