use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

// ============================================================================
// Task Modes
// ============================================================================

/// The five actions offered by the task selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskMode {
    Chat,
    MarketingPlan,
    AnalyzePdf,
    AnalyzeCsv,
    SearchReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Pdf,
    Csv,
}

impl TaskMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::MarketingPlan => "Generate Marketing Plan",
            Self::AnalyzePdf => "Analyze PDF",
            Self::AnalyzeCsv => "Analyze CSV",
            Self::SearchReport => "Search & Report",
        }
    }

    /// Text fields that must be non-empty before the action may run.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Chat => &["message"],
            Self::MarketingPlan => &["business_name", "industry", "goals"],
            Self::AnalyzePdf | Self::AnalyzeCsv => &[],
            Self::SearchReport => &["topic"],
        }
    }

    pub fn upload_kind(&self) -> Option<UploadKind> {
        match self {
            Self::AnalyzePdf => Some(UploadKind::Pdf),
            Self::AnalyzeCsv => Some(UploadKind::Csv),
            _ => None,
        }
    }

    /// Download name of the PDF produced for this mode, if it exports at all.
    pub fn export_filename(&self) -> Option<&'static str> {
        match self {
            Self::MarketingPlan => Some("MarketingPlan.pdf"),
            Self::SearchReport => Some("WebReport.pdf"),
            _ => None,
        }
    }

    pub fn descriptor(&self) -> TaskDescriptor {
        TaskDescriptor {
            mode: *self,
            slug: self.to_string(),
            label: self.label().to_string(),
            required_fields: self.required_fields().iter().map(|f| f.to_string()).collect(),
            upload: self.upload_kind(),
            export_filename: self.export_filename().map(str::to_string),
            retrieval: match self {
                Self::SearchReport => Some("model-knowledge-only".to_string()),
                _ => None,
            },
        }
    }

    pub fn descriptors() -> Vec<TaskDescriptor> {
        Self::iter().map(|m| m.descriptor()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub mode: TaskMode,
    pub slug: String,
    pub label: String,
    pub required_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<String>,
}

// ============================================================================
// Prompt / Chat Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Instruction text plus the model it is addressed to. Built once per action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub model: String,
    pub prompt: String,
}

impl PromptRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }

    /// A single user message; no history is carried between actions.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![ChatMessage::user(self.prompt.clone())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub model: String,
    pub text: String,
}

// ============================================================================
// Extracted Input
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    /// Pages for PDFs, preview rows for tables.
    pub units: usize,
}

/// Full uploaded table, returned for on-screen display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

// ============================================================================
// Action Outcome
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    pub mime_type: String,
    pub data_base64: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub filename: String,
    pub mime_type: String,
    pub data_base64: String,
    pub bytes: usize,
    pub pages: usize,
    pub cells: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub request_id: Uuid,
    pub mode: TaskMode,
    pub model: String,
    pub text: String,
    pub audio: Option<AudioClip>,
    pub audio_error: Option<String>,
    pub export: Option<ExportPayload>,
    pub export_error: Option<String>,
    pub table: Option<TableView>,
}
