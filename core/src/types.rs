//! Domain DTOs for the todo service.
//!
//! # Design
//! The same shapes serve three purposes: HTTP request/response bodies, the
//! JSON blobs stored under `todo:<id>` keys, and inputs to `TodoStore`.
//! `id` stays an opaque string; the store generates it and never parses it.

use serde::{Deserialize, Serialize};

/// A single todo item, as stored and as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// Payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Payload for updating an existing todo. Only the fields present in the
/// JSON are applied; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Merge the supplied fields over `todo`.
    pub fn apply(self, mut todo: Todo) -> Todo {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo
    }
}
