use serde::{Deserialize, Serialize};
use std::fmt;

use crate::export::ExportError;
use crate::extract::ParseError;
use crate::gateway::GatewayError;
use crate::speech::SynthesisError;

// ============================================================================
// Main Error Type
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Convenience constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExportError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

// ============================================================================
// Error Codes
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    // Client errors (4xx)
    BadRequest,
    ValidationError,
    ParseError,
    PayloadTooLarge,

    // Server errors (5xx)
    Internal,
    ConfigurationError,
    GatewayError,
    GatewayTimeout,

    // Degraded stages, reported next to the text
    SynthesisError,
    ExportError,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::ParseError => 400,
            Self::PayloadTooLarge => 413,
            Self::ValidationError => 422,
            Self::Internal => 500,
            Self::ConfigurationError => 500,
            Self::SynthesisError => 500,
            Self::ExportError => 500,
            Self::GatewayError => 502,
            Self::GatewayTimeout => 504,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.http_status() >= 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ParseError => "PARSE_ERROR",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Internal => "INTERNAL_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::GatewayError => "GATEWAY_ERROR",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
            Self::SynthesisError => "SYNTHESIS_ERROR",
            Self::ExportError => "EXPORT_ERROR",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// Error Response for HTTP
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: AppError,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// Validation Error Details
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: "INVALID".to_string(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(field.clone(), format!("{} is required", field)).with_code("MISSING")
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turns the collected problems into an error, or `Ok` when there were none.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_app_error())
        }
    }

    pub fn into_app_error(self) -> AppError {
        let fields = self
            .errors
            .iter()
            .map(|e| e.field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let details = serde_json::to_value(&self).unwrap_or(serde_json::Value::Null);
        AppError::new(
            ErrorCode::ValidationError,
            format!("Validation failed: {}", fields),
        )
        .with_details(details)
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Error Conversion Implementations
// ============================================================================

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::GatewayTimeout
        } else {
            ErrorCode::GatewayError
        };
        Self::new(code, err.to_string())
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        Self::new(ErrorCode::SynthesisError, err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        Self::export(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        let status = err.status();
        if status == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(ErrorCode::PayloadTooLarge, format!("Upload too large: {}", err))
        } else {
            Self::bad_request(format!("Multipart: {}", err))
        }
    }
}

// ============================================================================
// Backend-specific HTTP Response Conversion
// ============================================================================

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let response = ErrorResponse::new(self);

        (status, Json(response)).into_response()
    }
}

// ============================================================================
// Error Context Extension
// ============================================================================

pub trait ErrorContext<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<AppError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let mut err = e.into();
            err.message = format!("{}: {}", context.into(), err.message);
            err
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn log_error(error: &AppError) {
    if error.code.is_server_error() {
        log::error!("{}", error);
    } else {
        log::warn!("{}", error);
    }
}

// ============================================================================
// Tests
// ============================================================================
