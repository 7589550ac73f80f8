// Public module exports
pub mod analyze_csv;
pub mod analyze_pdf;
pub mod chat;
pub mod controller;
pub mod marketing_plan;
pub mod search_report;
pub mod selector;

use bytes::Bytes;
use std::collections::HashMap;

use crate::error::{AppError, Result, ValidationError, ValidationErrors};
use crate::models::{PromptRequest, TableView, TaskMode};

// Re-export main types for convenience
pub use controller::SessionController;
pub use selector::TaskSelector;

// ============================================================================
// Form Input
// ============================================================================

#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Fields submitted with one action.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    fields: HashMap<String, String>,
    upload: Option<Upload>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_field(name, value);
        self
    }

    pub fn with_upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_upload(&mut self, upload: Upload) {
        self.upload = Some(upload);
    }

    /// The submitted value, unless it is missing or blank.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// All named fields in order, or a validation error listing every blank one.
    pub fn require(&self, names: &[&str]) -> Result<Vec<&str>> {
        let mut errors = ValidationErrors::new();
        let mut values = Vec::with_capacity(names.len());
        for name in names {
            match self.field(name) {
                Some(value) => values.push(value),
                None => errors.add(ValidationError::missing(*name)),
            }
        }
        errors.into_result()?;
        Ok(values)
    }

    pub fn require_upload(&self) -> Result<&Upload> {
        self.upload
            .as_ref()
            .filter(|u| !u.bytes.is_empty())
            .ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add(ValidationError::missing("file"));
                errors.into_app_error()
            })
    }
}

// ============================================================================
// Prepared Action
// ============================================================================

/// Everything decided before the model is called.
#[derive(Debug, Clone)]
pub struct PreparedAction {
    pub mode: TaskMode,
    pub prompt: PromptRequest,
    pub export_filename: Option<&'static str>,
    pub table: Option<TableView>,
}

impl PreparedAction {
    pub fn new(mode: TaskMode, prompt: PromptRequest) -> Self {
        Self {
            mode,
            prompt,
            export_filename: mode.export_filename(),
            table: None,
        }
    }

    pub fn with_table(mut self, table: TableView) -> Self {
        self.table = Some(table);
        self
    }
}

pub(crate) fn unmapped_mode(slug: &str) -> AppError {
    AppError::configuration(format!("No task handler is mapped to mode '{}'", slug))
}
