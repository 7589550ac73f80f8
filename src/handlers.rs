use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::*;
use crate::init::AppState;
use crate::models::{ActionOutcome, TaskDescriptor, TaskMode};
use crate::tasks::{TaskForm, TaskSelector, Upload};

pub const INDEX_HTML: &str = include_str!("../static/index.html");
const SESSION_HEADER: &str = "x-session-id";

/// Per-request context. Used for log correlation and the speech language only.
/// The session id is echoed back in the `X-Session-ID` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    pub language: String,
}

// ============================================================================
// Middleware
// ============================================================================

pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session_id = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let language = request
        .headers()
        .get("X-Language")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.default_language.clone());

    let echoed = HeaderValue::from_str(&session_id).ok();
    request.extensions_mut().insert(SessionContext {
        session_id,
        language,
    });

    let mut response = next.run(request).await;
    if let Some(value) = echoed {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

// ============================================================================
// PAGE / HEALTH / TASK LIST
// ============================================================================

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub chat_endpoint: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chat_endpoint: state.controller.gateway_endpoint(),
    })
}

pub async fn list_tasks_handler() -> Json<Vec<TaskDescriptor>> {
    Json(TaskMode::descriptors())
}

// ============================================================================
// ACTION HANDLER
// ============================================================================

/// Runs one action for the mode in the path.
///
/// POST /api/tasks/{mode}
/// Body: multipart form, text fields plus an optional `file`
///
/// Returns: ActionOutcome JSON
pub async fn run_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(mode): Path<String>,
    multipart: Multipart,
) -> Result<Json<ActionOutcome>> {
    let mode = TaskSelector::resolve(&mode).inspect_err(log_error)?;
    let form = read_form(multipart).await?;
    log::info!(
        "📥 {} requested by session {}",
        mode.label(),
        session.session_id
    );

    let outcome = state
        .controller
        .run(mode, &form, &session.language)
        .await?;
    Ok(Json(outcome))
}

async fn read_form(mut multipart: Multipart) -> Result<TaskForm> {
    let mut form = TaskForm::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await?;
            log::debug!("Received upload {} ({} bytes)", filename, bytes.len());
            form.set_upload(Upload {
                filename,
                bytes,
            });
        } else {
            let value = field.text().await?;
            form.insert_field(name, value);
        }
    }

    Ok(form)
}

// ============================================================================
// EXPORT HANDLER
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub text: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Re-exports text already shown to the user as a PDF download.
///
/// POST /api/export
/// Body: { "text": "...", "filename": "WebReport.pdf" }
pub async fn export_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Response> {
    let filename = sanitize_filename(request.filename.as_deref());
    let artifact = state
        .controller
        .presenter()
        .exporter()
        .export(&request.text, &filename)
        .map_err(AppError::from)
        .inspect_err(log_error)?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::internal(format!("Header: {}", e)))?;
    let etag = HeaderValue::from_str(&format!("\"{}\"", artifact.sha256()))
        .map_err(|e| AppError::internal(format!("Header: {}", e)))?;
    let content_type = HeaderValue::from_str(&artifact.mime_type())
        .map_err(|e| AppError::internal(format!("Header: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::ETAG, etag),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// Keeps a plain `name.pdf`; anything else falls back to `Report.pdf`.
fn sanitize_filename(requested: Option<&str>) -> String {
    let stem = requested
        .map(|name| name.trim().trim_end_matches(".pdf"))
        .map(|stem| {
            stem.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
                .collect::<String>()
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Report".to_string());
    format!("{}.pdf", stem)
}
