pub mod error;
pub mod export;
pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod init;
pub mod models;
pub mod presenter;
pub mod speech;
pub mod tasks;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    export_handler, health_check, index_handler, list_tasks_handler, run_task_handler,
    session_middleware,
};

pub use crate::init::{AiConfig, AppState, Config};
pub use crate::models::{ActionOutcome, TaskMode};
pub use crate::tasks::{SessionController, TaskForm};

pub fn create_app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_check))
        .route("/api/tasks", get(list_tasks_handler))
        .route("/api/tasks/{mode}", post(run_task_handler))
        .route("/api/export", post(export_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
