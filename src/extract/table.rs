use comfy_table::{Cell, CellAlignment, Table, presets};

use super::ParseError;
use crate::models::{ExtractedDocument, TableView};

/// Data rows included in a prompt. Rows past this are dropped, not summarized.
pub const PREVIEW_ROWS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses a delimited upload with a header row. Short records are padded
/// with empty fields; a record wider than the header is an error.
pub fn parse_table(bytes: &[u8]) -> Result<ParsedTable, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding(e.to_string()))?;
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(record_error)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::MissingHeader);
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(record_error)?;
        if record.len() > width {
            return Err(ParseError::Record {
                record: record.position().map(|p| p.record()).unwrap_or(0),
                message: format!("{} fields, header has {}", record.len(), width),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(ParsedTable { headers, rows })
}

fn record_error(err: csv::Error) -> ParseError {
    ParseError::Record {
        record: err.position().map(|p| p.record()).unwrap_or(0),
        message: err.to_string(),
    }
}

impl ParsedTable {
    /// Index column, header, and the first `PREVIEW_ROWS` rows, right aligned.
    pub fn preview(&self) -> String {
        let mut table = Table::new();
        table.load_preset(presets::NOTHING);

        let mut header = vec![Cell::new("")];
        header.extend(self.headers.iter().map(Cell::new));
        table.set_header(header);

        for (index, row) in self.rows.iter().take(PREVIEW_ROWS).enumerate() {
            let mut cells = vec![Cell::new(index)];
            cells.extend(row.iter().map(Cell::new));
            table.add_row(cells);
        }

        for column in table.column_iter_mut() {
            column.set_cell_alignment(CellAlignment::Right);
        }

        table.to_string()
    }

    pub fn to_document(&self) -> ExtractedDocument {
        ExtractedDocument {
            text: self.preview(),
            units: self.rows.len().min(PREVIEW_ROWS),
        }
    }

    pub fn view(&self) -> TableView {
        TableView {
            headers: self.headers.clone(),
            rows: self.rows.clone(),
            total_rows: self.rows.len(),
        }
    }
}
