//! HTTP surface of the todo service.
//!
//! Each route is a thin translation of one `TodoStore` operation; status
//! codes and error bodies come from `ApiError`.

pub mod config;
pub mod error;
pub mod kv_client;

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use todo_core::{CreateTodo, Todo, TodoStore, UpdateTodo};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use kv_client::{Credentials, Login, TcpStore};

pub type AppState = Arc<TodoStore>;

pub fn app(store: AppState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Serve `app(store)` on `listener` until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    store: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn list_todos(State(store): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = store
        .list()
        .await
        .map_err(ApiError::store("Error fetching todos"))?;
    Ok(Json(todos))
}

async fn create_todo(
    State(store): State<AppState>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = payload?;
    let todo = store
        .create(input)
        .await
        .map_err(ApiError::store("Error creating todo"))?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let todo = store
        .get(&id)
        .await
        .map_err(ApiError::store("Error fetching todo"))?;
    Ok(Json(todo))
}

async fn update_todo(
    State(store): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(input) = payload?;
    let todo = store
        .update(&id, input)
        .await
        .map_err(ApiError::store("Error updating todo"))?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    store
        .delete(&id)
        .await
        .map_err(ApiError::store("Error deleting todo"))?;
    Ok(StatusCode::NO_CONTENT)
}
