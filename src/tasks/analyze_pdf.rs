use super::{PreparedAction, TaskForm};
use crate::error::{ErrorContext, Result};
use crate::extract::extract_pdf_text;
use crate::init::AiConfig;
use crate::models::{ExtractedDocument, PromptRequest, TaskMode};

const INSTRUCTION: &str =
    "Analyze this text and summarize what the report is about, include key insights and conclusions:";

pub fn build_prompt(document: &ExtractedDocument) -> String {
    format!("{}\n{}", INSTRUCTION, document.text)
}

pub fn prepare(form: &TaskForm, ai: &AiConfig) -> Result<PreparedAction> {
    let upload = form.require_upload()?;
    let document = extract_pdf_text(&upload.bytes).context(upload.filename.clone())?;
    log::info!(
        "📑 Extracted {} pages ({} chars) from {}",
        document.units,
        document.text.len(),
        upload.filename
    );

    Ok(PreparedAction::new(
        TaskMode::AnalyzePdf,
        PromptRequest::new(&ai.report_model, build_prompt(&document)),
    ))
}
