use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatGateway, GatewayError, RetryPolicy};
use crate::models::{ChatMessage, ChatResponse, PromptRequest};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    message: Option<ResponseMessage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

// ============================================================================
// Ollama Gateway
// ============================================================================

/// Non-streaming client for a locally hosted Ollama `/api/chat` endpoint.
pub struct OllamaGateway {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OllamaGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| GatewayError::Unreachable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            retry,
        })
    }

    fn timeout_error(&self) -> GatewayError {
        GatewayError::Timeout {
            secs: self.timeout.as_secs().max(1),
        }
    }

    fn classify(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            self.timeout_error()
        } else {
            GatewayError::Unreachable(err.to_string())
        }
    }

    async fn send_once(&self, request: &PromptRequest) -> Result<String, GatewayError> {
        tokio::time::timeout(self.timeout, self.post_chat(request))
            .await
            .map_err(|_| self.timeout_error())?
    }

    async fn post_chat(&self, request: &PromptRequest) -> Result<String, GatewayError> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: request.messages(),
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::ModelNotFound(request.model.clone()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        match (parsed.message, parsed.error) {
            (Some(message), _) => Ok(message.content),
            (None, Some(error)) => Err(GatewayError::Malformed(error)),
            (None, None) => Err(GatewayError::Malformed("missing message".to_string())),
        }
    }
}

#[async_trait]
impl ChatGateway for OllamaGateway {
    async fn send(&self, request: &PromptRequest) -> Result<ChatResponse, GatewayError> {
        log::debug!(
            "➡️  chat request to {} (model {}, {} chars)",
            self.base_url,
            request.model,
            request.prompt.len()
        );

        let text = self.retry.execute(|| self.send_once(request)).await?;

        Ok(ChatResponse {
            model: request.model.clone(),
            text,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = PromptRequest::new("mistral", "Hello");
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: request.messages(),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "mistral",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let gateway = OllamaGateway::new(
            "http://127.0.0.1:11434/",
            Duration::from_secs(5),
            RetryPolicy::none(),
        )
        .unwrap();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:11434/api/chat");
    }
}
