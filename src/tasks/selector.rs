use std::str::FromStr;

use super::{
    PreparedAction, TaskForm, analyze_csv, analyze_pdf, chat, marketing_plan, search_report,
    unmapped_mode,
};
use crate::error::Result;
use crate::init::AiConfig;
use crate::models::TaskMode;

/// Maps a mode to exactly one prompt builder. Holds no per-action state.
pub struct TaskSelector {
    ai: AiConfig,
}

impl TaskSelector {
    pub fn new(ai: AiConfig) -> Self {
        Self { ai }
    }

    /// Modes come from the selector widget, so an unknown slug is a wiring bug.
    pub fn resolve(slug: &str) -> Result<TaskMode> {
        TaskMode::from_str(slug).map_err(|_| unmapped_mode(slug))
    }

    pub fn prepare(&self, mode: TaskMode, form: &TaskForm) -> Result<PreparedAction> {
        match mode {
            TaskMode::Chat => chat::prepare(form, &self.ai),
            TaskMode::MarketingPlan => marketing_plan::prepare(form, &self.ai),
            TaskMode::AnalyzePdf => analyze_pdf::prepare(form, &self.ai),
            TaskMode::AnalyzeCsv => analyze_csv::prepare(form, &self.ai),
            TaskMode::SearchReport => search_report::prepare(form, &self.ai),
        }
    }
}
