//! Key/value persistence
//!
//! Everything the game keeps between sessions (currency balance, leaderboard,
//! audio settings) is stored as a JSON string under a fixed key. Backends:
//! - [`MemoryStorage`]: in-process map (native builds, tests)
//! - `LocalStorage`: browser storage (wasm32, see `platform::web`)
//!
//! Loads never fail: missing or corrupt data falls back to the default value.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// A string key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str);
}

/// Volatile storage backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Load a JSON value, falling back to `T::default()`
pub fn load_json<T>(storage: &dyn Storage, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(json) = storage.get(key) else {
        log::info!("No saved data under `{}`, starting fresh", key);
        return T::default();
    };
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Discarding corrupt data under `{}`: {}", key, e);
            T::default()
        }
    }
}

/// Serialize and store a value
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).map_err(|e| Error::Storage {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    storage.set(key, &json)
}
