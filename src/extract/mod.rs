//! Turns uploaded files into prompt text.

pub mod pdf;
pub mod table;

pub use pdf::extract_pdf_text;
pub use table::{PREVIEW_ROWS, ParsedTable, parse_table};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("upload is not a PDF document")]
    NotPdf,

    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("table is not UTF-8 text: {0}")]
    Encoding(String),

    #[error("table has no header row")]
    MissingHeader,

    #[error("table record {record}: {message}")]
    Record { record: u64, message: String },
}
