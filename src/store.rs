//! Whole-value key/value persistence used for settings and daily logs.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_AUTO_SWITCH: &str = "autoSwitch";
pub const KEY_LOGS_BY_DATE: &str = "logsByDate";

/// Values are read and written whole; there are no partial updates.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

pub async fn get_typed<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .with_context(|| format!("stored value for '{key}' has an unexpected shape")),
        None => Ok(None),
    }
}

pub async fn set_typed<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)
        .with_context(|| format!("failed to serialize value for '{key}'"))?;
    store.set(key, value).await
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn typed_values_through_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(get_typed::<bool>(&store, KEY_ENABLED).await.unwrap(), None);

        set_typed(&store, KEY_ENABLED, &true).await.unwrap();
        assert_eq!(get_typed::<bool>(&store, KEY_ENABLED).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn mismatched_shape_is_an_error() {
        let store = MemoryStore::new();
        store.set(KEY_AUTO_SWITCH, Value::from("yes")).await.unwrap();
        assert!(get_typed::<bool>(&store, KEY_AUTO_SWITCH).await.is_err());
    }
}
