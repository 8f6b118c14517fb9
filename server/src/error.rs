//! HTTP mapping of store failures.
//!
//! Every failure becomes a JSON body `{"error": "<message>"}`. Backend
//! details are logged, never returned: a 500 only carries the generic
//! message of the operation that failed.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use todo_core::StoreError;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("todo not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    /// Map a `StoreError`, using `context` as the public message for a 500.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |err| match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Validation(message) => ApiError::BadRequest(message),
            source => ApiError::Internal { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound => "Todo not found".to_string(),
            ApiError::BadRequest(message) => message,
            ApiError::Internal { context, source } => {
                error!(error = %source, "{context}");
                context.to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
