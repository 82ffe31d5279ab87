// src/infrastructure/json_storage.rs
//
// JSON helpers over the key-value repository
//
// RULES:
// - Reads never fail: a missing or malformed value yields the fallback
// - Every write/remove is announced on the event bus
// - Write failures propagate (they are unexpected)

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;
use crate::events::{EventBus, StorageValueChanged};
use crate::repositories::KeyValueRepository;

pub struct JsonStorage {
    repo: Arc<dyn KeyValueRepository>,
    event_bus: Arc<EventBus>,
}

impl JsonStorage {
    pub fn new(repo: Arc<dyn KeyValueRepository>, event_bus: Arc<EventBus>) -> Self {
        Self { repo, event_bus }
    }

    /// Serializes `value` and stores it under `key`.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let payload = serde_json::to_string(value)?;
        self.repo.set(key, &payload)?;
        self.event_bus
            .emit(StorageValueChanged::new(key.to_string(), false));
        Ok(())
    }

    /// Reads and parses the value under `key`, or returns `fallback`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.try_get_json(key).unwrap_or(fallback)
    }

    /// Like [`get_json`](Self::get_json) but distinguishes "nothing usable" as `None`.
    pub fn try_get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.repo.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read stored value for {:?}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Failed to parse stored value for {:?}: {}", key, e);
                None
            }
        }
    }

    pub fn remove_value(&self, key: &str) -> AppResult<()> {
        self.repo.remove(key)?;
        self.event_bus
            .emit(StorageValueChanged::new(key.to_string(), true));
        Ok(())
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        self.repo.keys_with_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovieSummary;
    use crate::repositories::InMemoryKeyValueRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn storage() -> (JsonStorage, Arc<InMemoryKeyValueRepository>, Arc<EventBus>) {
        let repo = Arc::new(InMemoryKeyValueRepository::new());
        let bus = Arc::new(EventBus::new());
        (JsonStorage::new(repo.clone(), bus.clone()), repo, bus)
    }

    #[test]
    fn test_missing_key_returns_fallback() {
        let (storage, _, _) = storage();
        let value: Vec<MovieSummary> = storage.get_json("favorites:nobody", Vec::new());
        assert!(value.is_empty());
        assert_eq!(storage.get_json("nothing", 7_i32), 7);
    }

    #[test]
    fn test_malformed_payload_returns_fallback() {
        let (storage, repo, _) = storage();
        repo.set("auth:user", "{not json").unwrap();
        let value: Option<String> = storage.get_json("auth:user", None);
        assert!(value.is_none());

        repo.set("count", "\"a string\"").unwrap();
        assert_eq!(storage.get_json("count", 3_u32), 3);
    }

    #[test]
    fn test_set_then_get() {
        let (storage, _, _) = storage();
        let movie = MovieSummary::new(5, "X");
        storage.set_json("favorites:u", &vec![movie.clone()]).unwrap();
        let read: Vec<MovieSummary> = storage.get_json("favorites:u", Vec::new());
        assert_eq!(read, vec![movie]);
    }

    #[test]
    fn test_remove_value() {
        let (storage, _, _) = storage();
        storage.set_json("k", &1).unwrap();
        storage.remove_value("k").unwrap();
        assert_eq!(storage.get_json("k", 0), 0);
    }

    #[test]
    fn test_writes_are_announced() {
        let (storage, _, bus) = storage();
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        bus.subscribe::<StorageValueChanged, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        storage.set_json("k", &1).unwrap();
        storage.remove_value("k").unwrap();

        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }
}
