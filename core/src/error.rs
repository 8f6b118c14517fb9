//! Error types for the todo store and its key-value backend.
//!
//! # Design
//! `KvError` describes what went wrong talking to the backing store.
//! `StoreError` is what `TodoStore` callers see: `NotFound` and `Validation`
//! get dedicated variants because the HTTP layer maps them to 404 and 400;
//! every backend failure collapses into `Storage` and becomes a 500.

use thiserror::Error;

/// Failures of a `KeyValueStore` round trip.
#[derive(Debug, Error)]
pub enum KvError {
    /// Socket read or write failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection before a reply arrived.
    #[error("connection closed by store")]
    ConnectionClosed,

    /// No reply within the configured command timeout.
    #[error("store did not reply within {0:?}")]
    Timeout(std::time::Duration),

    /// The store answered with an `ERR` reply.
    #[error("store error: {0}")]
    Server(String),

    /// The reply did not fit the command that was sent.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// A key or token cannot be embedded in a command line.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// A value spans more than one line.
    #[error("value for key {0:?} contains a line break")]
    InvalidValue(String),
}

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("todo not found")]
    NotFound,

    /// The request is missing a required field or carries an unusable id.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed, timed out, or returned an error.
    #[error("storage error: {0}")]
    Storage(#[from] KvError),

    /// A stored record could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
