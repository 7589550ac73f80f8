use super::{PreparedAction, TaskForm};
use crate::error::Result;
use crate::init::AiConfig;
use crate::models::{PromptRequest, TaskMode};

/// The message goes to the model untouched.
pub fn prepare(form: &TaskForm, ai: &AiConfig) -> Result<PreparedAction> {
    let message = form.require(TaskMode::Chat.required_fields())?[0];
    Ok(PreparedAction::new(
        TaskMode::Chat,
        PromptRequest::new(&ai.chat_model, message),
    ))
}
