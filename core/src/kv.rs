//! The key-value capability `TodoStore` is built on.
//!
//! # Design
//! `TodoStore` only needs three round trips: read a key, write a key, delete
//! a key. Hiding the connection behind this trait lets the server inject a
//! TCP-backed store while tests inject `MemoryStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::KvError;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read `key`, returning `None` when it is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Write `value` under `key`. `durable` requests persistence of the write.
    async fn set(&self, key: &str, value: &str, durable: bool) -> Result<(), KvError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str, durable: bool) -> Result<(), KvError>;
}

/// In-process store over a `HashMap`. Durability flags are ignored.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _durable: bool) -> Result<(), KvError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str, _durable: bool) -> Result<(), KvError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
