use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::export::PdfExporter;
use crate::gateway::{OllamaGateway, RetryPolicy};
use crate::presenter::ResponsePresenter;
use crate::speech::GoogleTts;
use crate::tasks::SessionController;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ai: AiConfig,
    pub gateway_timeout_secs: u64,
    pub gateway_max_retries: u32,
    pub gateway_backoff_ms: u64,
    pub tts: TtsConfig,
    pub max_upload_mb: usize,
}

/// Where the model lives and which model each task talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub url: String,
    pub chat_model: String,
    pub report_model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:11434".to_string(),
            chat_model: "mistral".to_string(),
            report_model: "llama2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsConfig {
    pub url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let ai_defaults = AiConfig::default();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse_var("PORT", &var("PORT", "3000"))?,
            ai: AiConfig {
                url: var("OLLAMA_URL", &ai_defaults.url),
                chat_model: var("CHAT_MODEL", &ai_defaults.chat_model),
                report_model: var("REPORT_MODEL", &ai_defaults.report_model),
            },
            gateway_timeout_secs: parse_var(
                "GATEWAY_TIMEOUT_SECS",
                &var("GATEWAY_TIMEOUT_SECS", "120"),
            )?,
            gateway_max_retries: parse_var(
                "GATEWAY_MAX_RETRIES",
                &var("GATEWAY_MAX_RETRIES", "2"),
            )?,
            gateway_backoff_ms: parse_var("GATEWAY_BACKOFF_MS", &var("GATEWAY_BACKOFF_MS", "500"))?,
            tts: TtsConfig {
                url: var("TTS_URL", "https://translate.google.com/translate_tts"),
                language: var("TTS_LANGUAGE", "en"),
                timeout_secs: parse_var("TTS_TIMEOUT_SECS", &var("TTS_TIMEOUT_SECS", "30"))?,
            },
            max_upload_mb: parse_var("MAX_UPLOAD_MB", &var("MAX_UPLOAD_MB", "20"))?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.gateway_max_retries, self.gateway_backoff_ms, 8_000)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| AppError::configuration(format!("{}={:?}: {}", key, value, e)))
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub default_language: String,
    pub max_upload_bytes: usize,
}

pub async fn app_init() -> Result<(Config, Arc<AppState>)> {
    let config = Config::from_env()?;
    log::info!("✅ Configuration loaded");

    log::info!("🦙 Connecting chat gateway to {}...", config.ai.url);
    let gateway = OllamaGateway::new(
        config.ai.url.clone(),
        Duration::from_secs(config.gateway_timeout_secs),
        config.retry_policy(),
    )?;
    log::info!("✅ Chat gateway ready");

    let tts = GoogleTts::new(
        config.tts.url.clone(),
        Duration::from_secs(config.tts.timeout_secs),
    )?;
    log::info!("✅ Speech synthesis ready ({})", config.tts.language);

    let presenter = ResponsePresenter::new(Arc::new(tts), PdfExporter::default());
    let controller = Arc::new(SessionController::new(
        config.ai.clone(),
        Arc::new(gateway),
        presenter,
    ));

    let state = Arc::new(AppState {
        controller,
        default_language: config.tts.language.clone(),
        max_upload_bytes: config.max_upload_bytes(),
    });
    Ok((config, state))
}
