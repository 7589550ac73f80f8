use super::{PreparedAction, TaskForm};
use crate::error::{ErrorContext, Result};
use crate::extract::parse_table;
use crate::init::AiConfig;
use crate::models::{ExtractedDocument, PromptRequest, TaskMode};

const INSTRUCTION: &str =
    "Analyze this dataset and write a detailed report about its contents, trends, and insights:";

pub fn build_prompt(preview: &ExtractedDocument) -> String {
    format!("{}\n{}", INSTRUCTION, preview.text)
}

/// Prompts with the bounded preview; the whole table rides along for display.
pub fn prepare(form: &TaskForm, ai: &AiConfig) -> Result<PreparedAction> {
    let upload = form.require_upload()?;
    let table = parse_table(&upload.bytes).context(upload.filename.clone())?;
    let preview = table.to_document();
    log::info!(
        "📊 Parsed {} rows x {} columns from {} ({} in prompt)",
        table.rows.len(),
        table.headers.len(),
        upload.filename,
        preview.units
    );

    Ok(PreparedAction::new(
        TaskMode::AnalyzeCsv,
        PromptRequest::new(&ai.report_model, build_prompt(&preview)),
    )
    .with_table(table.view()))
}
