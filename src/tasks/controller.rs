use std::sync::Arc;
use uuid::Uuid;

use super::{TaskForm, TaskSelector};
use crate::error::{AppError, Result, log_error};
use crate::gateway::ChatGateway;
use crate::init::AiConfig;
use crate::models::{ActionOutcome, TaskMode};
use crate::presenter::{RenderOptions, ResponsePresenter};

// ============================================================================
// SESSION CONTROLLER
// ============================================================================

/// Runs one action end to end: build prompt, one gateway call, render.
///
/// Nothing survives between calls to [`SessionController::run`]; two actions
/// never share a prompt, response or artifact.
pub struct SessionController {
    selector: TaskSelector,
    gateway: Arc<dyn ChatGateway>,
    presenter: ResponsePresenter,
}

impl SessionController {
    pub fn new(
        ai: AiConfig,
        gateway: Arc<dyn ChatGateway>,
        presenter: ResponsePresenter,
    ) -> Self {
        Self {
            selector: TaskSelector::new(ai),
            gateway,
            presenter,
        }
    }

    pub fn presenter(&self) -> &ResponsePresenter {
        &self.presenter
    }

    pub fn gateway_endpoint(&self) -> String {
        self.gateway.endpoint()
    }

    pub async fn run(&self, mode: TaskMode, form: &TaskForm, language: &str) -> Result<ActionOutcome> {
        let request_id = Uuid::now_v7();
        log::info!("▶️  {} action {}", mode, request_id);

        let prepared = self.selector.prepare(mode, form).inspect_err(log_error)?;

        let response = self
            .gateway
            .send(&prepared.prompt)
            .await
            .map_err(AppError::from)
            .inspect_err(log_error)?;
        log::info!(
            "💬 {} answered {} chars for {}",
            response.model,
            response.text.len(),
            request_id
        );

        let options = RenderOptions {
            language: language.to_string(),
            export_filename: prepared.export_filename,
        };
        let rendered = self.presenter.render(&response.text, &options).await;

        Ok(ActionOutcome {
            request_id,
            mode,
            model: response.model,
            text: rendered.text,
            audio: rendered.audio,
            audio_error: rendered.audio_error,
            export: rendered.export,
            export_error: rendered.export_error,
            table: prepared.table,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
