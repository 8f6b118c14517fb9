//! Todo records kept in a remote key-value store.
//!
//! # Overview
//! `TodoStore` implements create, list, get, update and delete for todo
//! items on top of any `KeyValueStore`. Records live under `todo:<id>` keys
//! and a JSON array under `todo_ids` lists the live ids in creation order.
//!
//! # Design
//! - The crate performs no network I/O. `KeyValueStore` is the seam where a
//!   TCP-backed store (see `todo-server`) or `MemoryStore` plugs in.
//! - `protocol` is a sans-IO codec for the store's line protocol: it builds
//!   command lines and classifies reply lines.
//! - Index mutations are serialized inside `TodoStore`, so concurrent
//!   creates in one process never lose an id.

pub mod error;
pub mod id;
pub mod kv;
pub mod protocol;
pub mod store;
pub mod types;

pub use error::{KvError, StoreError};
pub use id::IdGenerator;
pub use kv::{KeyValueStore, MemoryStore};
pub use protocol::{Command, Reply};
pub use store::{TodoStore, INDEX_KEY, RECORD_PREFIX};
pub use types::{CreateTodo, Todo, UpdateTodo};
