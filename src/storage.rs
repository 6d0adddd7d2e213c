use anyhow::anyhow;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::errors::{AppError, AppResult};

// Import logging macros
use crate::log_store_operation;

/// Persisted key names
pub mod keys {
    pub const AUTH: &str = "auth";
    pub const PROFILE: &str = "profile";
    pub const NAME: &str = "name";
    pub const STREAK: &str = "streak";
    pub const FEED: &str = "feed";
    pub const WEAKNESS: &str = "weakness";
    pub const TASKS_TODAY: &str = "tasks_today";
    pub const PYMK: &str = "pymk";
    pub const QUIZ_SUBJECTS: &str = "quizSubjects";
    pub const SAVED_TUTORS: &str = "saved_tutors";

    pub const TUTOR_THREAD_PREFIX: &str = "tutor_thread_";
    pub const BUDDY_THREAD_PREFIX: &str = "buddy_thread_";

    pub const KNOWN: [&str; 10] = [
        AUTH,
        PROFILE,
        STREAK,
        FEED,
        WEAKNESS,
        NAME,
        TASKS_TODAY,
        PYMK,
        QUIZ_SUBJECTS,
        SAVED_TUTORS,
    ];

    pub const THREAD_PREFIXES: [&str; 2] = [TUTOR_THREAD_PREFIX, BUDDY_THREAD_PREFIX];
}

/// String-keyed store of string values. Implementations only move opaque
/// values around; encoding lives in [`Storage`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    async fn keys(&self) -> anyhow::Result<Vec<String>>;
}

/// Process-local store, used by tests and the `memory` storage URL
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

pub const RECORD_VERSION: u32 = 1;

#[derive(Serialize)]
struct VersionedRef<'a, T> {
    v: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Versioned<T> {
    v: u32,
    data: T,
}

/// Decode a stored value: the current versioned envelope first, then the
/// bare legacy shape.
pub fn decode_record<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if let Ok(record) = serde_json::from_value::<Versioned<T>>(value.clone()) {
        if record.v == RECORD_VERSION {
            return Ok(record.data);
        }
    }
    serde_json::from_value(value)
}

pub fn encode_record<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&VersionedRef {
        v: RECORD_VERSION,
        data: value,
    })
}

/// Typed access to the injected key-value store.
///
/// Reads never fail: a missing key, a backend error or an undecodable value
/// all produce the caller's fallback. Writes propagate backend errors, and
/// read-modify-write refuses to replace a value it cannot decode.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Storage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// `None` when the key is missing or its value cannot be used
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log_store_operation!(error, "get", error = e);
                return None;
            }
        };

        match decode_record(&raw) {
            Ok(value) => {
                log_store_operation!(debug, "get", key = key);
                Some(value)
            }
            Err(e) => {
                log_store_operation!(warn, "decode", key = key, error = e);
                None
            }
        }
    }

    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.try_get(key).await.unwrap_or(fallback)
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let encoded = encode_record(value).map_err(anyhow::Error::from)?;
        self.store.set(key, &encoded).await?;
        log_store_operation!(debug, "set", key = key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.store.delete(key).await?;
        log_store_operation!(debug, "delete", key = key);
        Ok(())
    }

    /// Text value that may have been written as a bare string rather than
    /// JSON. Values that are JSON but not a string are treated as missing.
    pub async fn get_text(&self, key: &str) -> Option<String> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                log_store_operation!(error, "get", error = e);
                return None;
            }
        };

        match decode_record::<String>(&raw) {
            Ok(text) => Some(text),
            Err(e) if serde_json::from_str::<serde_json::Value>(&raw).is_ok() => {
                log_store_operation!(warn, "decode", key = key, error = e);
                None
            }
            Err(_) => Some(raw),
        }
    }

    /// Strict read for the write paths: backend and decode errors propagate
    /// so an unreadable value is never silently replaced.
    async fn read_for_update<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match decode_record(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log_store_operation!(warn, "update", key = key, error = e);
                Err(AppError::StorageError(anyhow!(
                    "stored value for '{}' cannot be decoded: {}",
                    key,
                    e
                )))
            }
        }
    }

    /// Read-modify-write under the storage write lock. `init` supplies the
    /// value when the key is missing. A present but undecodable value is an
    /// error and is left untouched. The value is persisted only when `f`
    /// succeeds.
    pub async fn update<T, R, I, F>(&self, key: &str, init: I, f: F) -> AppResult<R>
    where
        T: Serialize + DeserializeOwned,
        I: FnOnce() -> T,
        F: FnOnce(&mut T) -> AppResult<R>,
    {
        let _guard = self.write_lock.lock().await;
        let mut value = match self.read_for_update(key).await? {
            Some(value) => value,
            None => init(),
        };
        let result = f(&mut value)?;
        self.set(key, &value).await?;
        Ok(result)
    }

    /// Like [`Storage::update`] but a missing key is left missing and
    /// yields `None`.
    pub async fn update_existing<T, R, F>(&self, key: &str, f: F) -> AppResult<Option<R>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> AppResult<R>,
    {
        let _guard = self.write_lock.lock().await;
        let Some(mut value) = self.read_for_update::<T>(key).await? else {
            return Ok(None);
        };
        let result = f(&mut value)?;
        self.set(key, &value).await?;
        Ok(Some(result))
    }

    /// Delete every known key plus every chat thread
    pub async fn clear_all(&self) -> AppResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut removed = 0;
        for key in keys::KNOWN {
            if self.store.get(key).await?.is_some() {
                removed += 1;
            }
            self.store.delete(key).await?;
        }

        for key in self.store.keys().await? {
            if keys::THREAD_PREFIXES.iter().any(|p| key.starts_with(p)) {
                self.store.delete(&key).await?;
                removed += 1;
            }
        }

        log_store_operation!(info, "clear_all", format!("removed {} keys", removed));
        Ok(removed)
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_yields_fallback() {
        let storage = Storage::in_memory();
        let value: Vec<String> = storage.get_or(keys::WEAKNESS, vec!["x".to_string()]).await;
        assert_eq!(value, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn test_round_trip_uses_envelope() {
        let storage = Storage::in_memory();
        storage.set(keys::STREAK, &4u32).await.unwrap();

        let raw = storage.backend().get(keys::STREAK).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"v":1,"data":4}"#);
        assert_eq!(storage.get_or(keys::STREAK, 0u32).await, 4);
    }

    #[tokio::test]
    async fn test_legacy_bare_values_decode() {
        let storage = Storage::in_memory();
        storage.backend().set(keys::STREAK, "7").await.unwrap();
        storage
            .backend()
            .set(keys::WEAKNESS, r#"["Algebra"]"#)
            .await
            .unwrap();

        assert_eq!(storage.get_or(keys::STREAK, 0u32).await, 7);
        assert_eq!(
            storage.get_or::<Vec<String>>(keys::WEAKNESS, vec![]).await,
            vec!["Algebra".to_string()]
        );
    }

    #[tokio::test]
    async fn test_corrupt_value_yields_fallback() {
        let storage = Storage::in_memory();
        storage.backend().set(keys::FEED, "{not json").await.unwrap();
        storage.backend().set(keys::STREAK, r#""many""#).await.unwrap();

        assert!(storage.try_get::<Vec<String>>(keys::FEED).await.is_none());
        assert_eq!(storage.get_or(keys::STREAK, 0u32).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_envelope_version_is_not_trusted() {
        let storage = Storage::in_memory();
        storage
            .backend()
            .set(keys::STREAK, r#"{"v":99,"data":3}"#)
            .await
            .unwrap();
        assert_eq!(storage.get_or(keys::STREAK, 0u32).await, 0);
    }

    #[tokio::test]
    async fn test_update_does_not_persist_on_error() {
        let storage = Storage::in_memory();
        let result: AppResult<()> = storage
            .update(keys::STREAK, || 1u32, |_| {
                Err(crate::errors::AppError::validation("nope"))
            })
            .await;
        assert!(result.is_err());
        assert!(storage.backend().get(keys::STREAK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_leaves_undecodable_value_untouched() {
        let storage = Storage::in_memory();
        storage.backend().set(keys::FEED, "{not json").await.unwrap();

        let result = storage
            .update(keys::FEED, Vec::new, |posts: &mut Vec<String>| {
                posts.push("new".to_string());
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(AppError::StorageError(_))));
        assert_eq!(
            storage.backend().get(keys::FEED).await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_update_existing_skips_missing_key() {
        let storage = Storage::in_memory();
        let result = storage
            .update_existing(keys::STREAK, |streak: &mut u32| {
                *streak += 1;
                Ok(*streak)
            })
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(storage.backend().get(keys::STREAK).await.unwrap().is_none());

        storage.set(keys::STREAK, &2u32).await.unwrap();
        let result = storage
            .update_existing(keys::STREAK, |streak: &mut u32| {
                *streak += 1;
                Ok(*streak)
            })
            .await
            .unwrap();
        assert_eq!(result, Some(3));
    }

    #[tokio::test]
    async fn test_text_accepts_bare_and_json_strings() {
        let storage = Storage::in_memory();
        assert_eq!(storage.get_text(keys::NAME).await, None);

        storage.backend().set(keys::NAME, "Priya").await.unwrap();
        assert_eq!(storage.get_text(keys::NAME).await.as_deref(), Some("Priya"));

        storage.set(keys::NAME, &"Sam").await.unwrap();
        assert_eq!(storage.get_text(keys::NAME).await.as_deref(), Some("Sam"));

        storage.backend().set(keys::NAME, "[1,2]").await.unwrap();
        assert_eq!(storage.get_text(keys::NAME).await, None);
    }

    #[tokio::test]
    async fn test_clear_all_removes_known_keys_and_threads() {
        let storage = Storage::in_memory();
        storage.set(keys::FEED, &Vec::<String>::new()).await.unwrap();
        storage.set(keys::NAME, &"Sam").await.unwrap();
        storage.set("tutor_thread_1", &Vec::<String>::new()).await.unwrap();
        storage.set("buddy_thread_12", &Vec::<String>::new()).await.unwrap();
        storage.set("unrelated", &1u32).await.unwrap();

        let removed = storage.clear_all().await.unwrap();
        assert_eq!(removed, 4);

        let mut remaining = storage.backend().keys().await.unwrap();
        remaining.sort();
        assert_eq!(remaining, vec!["unrelated".to_string()]);
    }
}
