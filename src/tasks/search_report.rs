use super::{PreparedAction, TaskForm};
use crate::error::{Result, ValidationError, ValidationErrors};
use crate::init::AiConfig;
use crate::models::{PromptRequest, TaskMode};

// No retrieval happens here: the model answers from what it already knows.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Search the web for the topic: {}.\n\
         Write a detailed report with an introduction, body, conclusion,\n\
         and include citations from reliable sources.",
        topic
    )
}

pub fn prepare(form: &TaskForm, ai: &AiConfig) -> Result<PreparedAction> {
    let topic = form.field("topic").or_else(|| form.field("query"));
    let Some(topic) = topic else {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::missing("topic"));
        return Err(errors.into_app_error());
    };

    Ok(PreparedAction::new(
        TaskMode::SearchReport,
        PromptRequest::new(&ai.report_model, build_prompt(topic)),
    ))
}
