//! Todo records and their index, kept in a key-value store.
//!
//! # Design
//! Two kinds of keys live in the backing store:
//!
//! - `todo_ids` holds a JSON array with the id of every live todo, in
//!   creation order.
//! - `todo:<id>` holds the JSON record of one todo.
//!
//! The store offers no multi-key transactions, so the index and the records
//! are only eventually consistent. Writers keep them in step: create writes
//! the record before appending to the index, delete removes the record
//! before pruning the index. Readers are permissive: an index that is missing
//! or does not decode reads as empty, and `list` skips ids whose record is
//! missing or does not decode.
//!
//! Index read-modify-write cycles run under `index_lock`, so concurrent
//! creates in one process never drop each other's ids. Processes sharing a
//! store can still race on the index.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::id::IdGenerator;
use crate::kv::KeyValueStore;
use crate::protocol;
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Key of the JSON array listing every todo id.
pub const INDEX_KEY: &str = "todo_ids";

/// Prefix of the per-todo record keys.
pub const RECORD_PREFIX: &str = "todo:";

/// Every mutation requests a durable write.
const DURABLE: bool = true;

/// Derive the record key for `id`.
///
/// Ids end up inside protocol lines, so an empty id or one carrying
/// whitespace is rejected here rather than by the store.
pub fn record_key(id: &str) -> Result<String, StoreError> {
    protocol::validate_word(id)
        .map_err(|_| StoreError::Validation(format!("invalid todo id {id:?}")))?;
    Ok(format!("{RECORD_PREFIX}{id}"))
}

fn decode_index(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str(raw).ok()
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title is required".to_string()));
    }
    Ok(())
}

pub struct TodoStore {
    kv: Arc<dyn KeyValueStore>,
    ids: IdGenerator,
    index_lock: Mutex<()>,
}

impl TodoStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            ids: IdGenerator::new(),
            index_lock: Mutex::new(()),
        }
    }

    /// Make sure the index key holds a valid id array, writing `[]` when it
    /// is missing or corrupt. A valid index is left untouched.
    pub async fn init(&self) -> Result<(), StoreError> {
        let _guard = self.index_lock.lock().await;
        match self.kv.get(INDEX_KEY).await? {
            Some(raw) if decode_index(&raw).is_some() => {
                debug!("todo index present");
                return Ok(());
            }
            Some(_) => warn!("todo index is not a JSON id array, resetting"),
            None => info!("todo index missing, initializing"),
        }
        self.kv.set(INDEX_KEY, "[]", DURABLE).await?;
        Ok(())
    }

    pub async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        validate_title(&input.title)?;
        let todo = Todo {
            id: self.ids.next_id(),
            title: input.title,
            completed: input.completed,
        };
        self.write_record(&record_key(&todo.id)?, &todo).await?;

        let _guard = self.index_lock.lock().await;
        let mut ids = self.read_index().await?;
        ids.push(todo.id.clone());
        self.write_index(&ids).await?;

        info!(id = %todo.id, "created todo");
        Ok(todo)
    }

    /// Every todo reachable from the index, in index order.
    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let ids = self.read_index().await?;
        let mut todos = Vec::with_capacity(ids.len());
        for id in ids {
            let Ok(key) = record_key(&id) else {
                warn!(id = %id, "skipping unusable id in index");
                continue;
            };
            let Some(raw) = self.kv.get(&key).await? else {
                debug!(id = %id, "skipping dangling id");
                continue;
            };
            match serde_json::from_str::<Todo>(&raw) {
                Ok(todo) => todos.push(todo),
                Err(err) => warn!(id = %id, error = %err, "skipping undecodable record"),
            }
        }
        Ok(todos)
    }

    pub async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        let key = record_key(id)?;
        self.read_record(&key).await
    }

    pub async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, StoreError> {
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        let key = record_key(id)?;
        let existing = self.read_record(&key).await?;
        let mut todo = input.apply(existing);
        // The key is authoritative; a stale id inside the blob is overwritten.
        todo.id = id.to_string();
        self.write_record(&key, &todo).await?;

        info!(id = %todo.id, "updated todo");
        Ok(todo)
    }

    /// Remove the record for `id`, then drop `id` from the index.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let key = record_key(id)?;
        if self.kv.get(&key).await?.is_none() {
            return Err(StoreError::NotFound);
        }
        self.kv.delete(&key, DURABLE).await?;

        let _guard = self.index_lock.lock().await;
        let mut ids = self.read_index().await?;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() != before {
            self.write_index(&ids).await?;
        }

        info!(id = %id, "deleted todo");
        Ok(())
    }

    async fn read_record(&self, key: &str) -> Result<Todo, StoreError> {
        let raw = self.kv.get(key).await?.ok_or(StoreError::NotFound)?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_record(&self, key: &str, todo: &Todo) -> Result<(), StoreError> {
        let raw = serde_json::to_string(todo)?;
        self.kv.set(key, &raw, DURABLE).await?;
        Ok(())
    }

    async fn read_index(&self) -> Result<Vec<String>, StoreError> {
        let Some(raw) = self.kv.get(INDEX_KEY).await? else {
            return Ok(Vec::new());
        };
        Ok(decode_index(&raw).unwrap_or_else(|| {
            warn!("todo index is not a JSON id array, treating as empty");
            Vec::new()
        }))
    }

    async fn write_index(&self, ids: &[String]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(ids)?;
        self.kv.set(INDEX_KEY, &raw, DURABLE).await?;
        Ok(())
    }
}
