//! Chat completion gateway.
//!
//! One `send` is one logical request to the language model: a single user
//! message in, the full generated text out. Transport retries happen below
//! this seam and are invisible to callers.

pub mod ollama;
pub mod retry;

use async_trait::async_trait;

use crate::models::{ChatResponse, PromptRequest};

pub use ollama::OllamaGateway;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("chat service unreachable: {0}")]
    Unreachable(String),

    #[error("model '{0}' not found on chat service")]
    ModelNotFound(String),

    #[error("chat service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed chat response: {0}")]
    Malformed(String),

    #[error("chat service did not answer within {secs}s")]
    Timeout { secs: u64 },
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Failures worth another attempt: the service may answer next time.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout { .. } => true,
            Self::Status { code, .. } => *code >= 500 || *code == 429,
            Self::ModelNotFound(_) | Self::Malformed(_) => false,
        }
    }
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send(&self, request: &PromptRequest) -> Result<ChatResponse, GatewayError>;

    /// Where requests go, for health output and logs.
    fn endpoint(&self) -> String;
}
