//! PDF export of model output.
//!
//! Layout follows a plain report: A4 portrait, 15 mm margins, Helvetica 12 pt,
//! 5 mm rows. Every newline-delimited source line becomes one cell, word
//! wrapped to the text width, and is written as one `BT`/`ET` text object.
//! Streams are left uncompressed.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use sha2::{Digest, Sha256};

use crate::models::ExportPayload;

const MM: f32 = 72.0 / 25.4;
const FONT_NAME: &[u8] = b"F1";

// Helvetica advance widths (1/1000 em) for bytes 0x20..=0x7e.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
const DEFAULT_WIDTH: u16 = 556;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("character {ch:?} on line {line} cannot be encoded in the PDF body font")]
    Unencodable { ch: char, line: usize },

    #[error("PDF serialization failed: {0}")]
    Write(String),
}

// ============================================================================
// Artifact
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub cells: usize,
}

impl ExportArtifact {
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .to_string()
    }

    pub fn to_payload(&self) -> ExportPayload {
        use base64::Engine;

        ExportPayload {
            filename: self.filename.clone(),
            mime_type: self.mime_type(),
            data_base64: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
            bytes: self.bytes.len(),
            pages: self.pages,
            cells: self.cells,
            sha256: self.sha256(),
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub font_size_pt: f32,
    pub line_height_mm: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            font_size_pt: 12.0,
            line_height_mm: 5.0,
        }
    }
}

// ============================================================================
// Exporter
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    layout: PageLayout,
}

impl PdfExporter {
    pub fn export(&self, text: &str, filename: &str) -> Result<ExportArtifact, ExportError> {
        let layout = &self.layout;
        let page_width = layout.page_width_mm * MM;
        let page_height = layout.page_height_mm * MM;
        let margin = layout.margin_mm * MM;
        let line_height = layout.line_height_mm * MM;
        let text_width = page_width - 2.0 * margin;
        let top = page_height - margin;

        let rows_per_page = rows_fitting(top, margin, line_height);
        let mut pages: Vec<Vec<Operation>> = vec![Vec::new()];
        let mut cursor = top;
        let mut cells = 0;

        for (index, line) in text.split('\n').enumerate() {
            let encoded = encode_win_ansi(line.trim_end_matches('\r'), index + 1)?;
            let rows = wrap(&encoded, text_width, layout.font_size_pt);

            // A line starts on the next page unless it is taller than a whole page.
            let room = rows_fitting(cursor, margin, line_height);
            if rows.len() > room && cursor < top && (rows.len() <= rows_per_page || room == 0) {
                pages.push(Vec::new());
                cursor = top;
            }

            begin_text(current_page(&mut pages), layout.font_size_pt);
            for row in rows {
                if cursor - line_height < margin {
                    current_page(&mut pages).push(Operation::new("ET", vec![]));
                    pages.push(Vec::new());
                    cursor = top;
                    begin_text(current_page(&mut pages), layout.font_size_pt);
                }

                let baseline = cursor - 0.5 * line_height - 0.3 * layout.font_size_pt;
                let ops = current_page(&mut pages);
                ops.push(Operation::new(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        Object::from(margin),
                        Object::from(baseline),
                    ],
                ));
                if !row.is_empty() {
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::String(row, StringFormat::Literal)],
                    ));
                }
                cursor -= line_height;
            }
            current_page(&mut pages).push(Operation::new("ET", vec![]));
            cells += 1;
        }

        let page_count = pages.len();
        let bytes = self.assemble(pages, page_width, page_height)?;
        Ok(ExportArtifact {
            filename: filename.to_string(),
            bytes,
            pages: page_count,
            cells,
        })
    }

    fn assemble(
        &self,
        pages: Vec<Vec<Operation>>,
        page_width: f32,
        page_height: f32,
    ) -> Result<Vec<u8>, ExportError> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let count = pages.len() as i64;
        let mut kids = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| ExportError::Write(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(page_width),
                Object::from(page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ExportError::Write(e.to_string()))?;
        Ok(bytes)
    }
}

/// Rows that fit between `cursor` and the bottom margin, stepping the same way
/// the layout loop does.
fn rows_fitting(cursor: f32, margin: f32, line_height: f32) -> usize {
    let mut rows = 0;
    let mut cursor = cursor;
    while cursor - line_height >= margin {
        cursor -= line_height;
        rows += 1;
    }
    rows
}

fn current_page(pages: &mut [Vec<Operation>]) -> &mut Vec<Operation> {
    let last = pages.len() - 1;
    &mut pages[last]
}

fn begin_text(ops: &mut Vec<Operation>, font_size: f32) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(FONT_NAME.to_vec()), Object::from(font_size)],
    ));
}

// ============================================================================
// Encoding & Wrapping
// ============================================================================

/// Maps a line to WinAnsi bytes. Latin-1 passes through; common typographic
/// punctuation uses the 0x80..0x9f slots. Control characters print as spaces.
fn encode_win_ansi(line: &str, line_number: usize) -> Result<Vec<u8>, ExportError> {
    line.chars()
        .map(|ch| match ch {
            '\u{0}'..='\u{1f}' | '\u{7f}' => Ok(b' '),
            ' '..='~' => Ok(ch as u8),
            '\u{a0}'..='\u{ff}' => Ok(ch as u32 as u8),
            '€' => Ok(0x80),
            '…' => Ok(0x85),
            '‘' => Ok(0x91),
            '’' => Ok(0x92),
            '“' => Ok(0x93),
            '”' => Ok(0x94),
            '•' => Ok(0x95),
            '–' => Ok(0x96),
            '—' => Ok(0x97),
            '™' => Ok(0x99),
            _ => Err(ExportError::Unencodable {
                ch,
                line: line_number,
            }),
        })
        .collect()
}

fn glyph_width(byte: u8, font_size: f32) -> f32 {
    let units = match byte {
        0x20..=0x7e => HELVETICA_WIDTHS[(byte - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    };
    f32::from(units) * font_size / 1000.0
}

/// Breaks at the last space that fits; words wider than a row are split.
/// Always yields at least one (possibly empty) row.
fn wrap(line: &[u8], max_width: f32, font_size: f32) -> Vec<Vec<u8>> {
    let mut rows = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut width = 0.0;
    let mut last_space: Option<usize> = None;

    for &byte in line {
        let advance = glyph_width(byte, font_size);
        if width + advance > max_width && !current.is_empty() {
            match last_space.take() {
                Some(space) => {
                    let rest = current.split_off(space + 1);
                    current.truncate(space);
                    rows.push(std::mem::replace(&mut current, rest));
                }
                None => rows.push(std::mem::take(&mut current)),
            }
            width = current.iter().map(|&b| glyph_width(b, font_size)).sum();
        }
        if byte == b' ' {
            last_space = Some(current.len());
        }
        current.push(byte);
        width += advance;
    }
    rows.push(current);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Text of every `BT`..`ET` object per page, rows joined with a space.
    fn cells_per_page(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        let mut pages = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            let mut cells = Vec::new();
            let mut rows: Option<Vec<String>> = None;
            for op in content.operations {
                match op.operator.as_str() {
                    "BT" => rows = Some(Vec::new()),
                    "Tj" => {
                        if let (Some(rows), Some(Object::String(text, _))) =
                            (rows.as_mut(), op.operands.first())
                        {
                            rows.push(String::from_utf8_lossy(text).into_owned());
                        }
                    }
                    "ET" => cells.push(rows.take().unwrap_or_default().join(" ")),
                    _ => {}
                }
            }
            pages.push(cells);
        }
        pages
    }

    fn cells_of(bytes: &[u8]) -> Vec<String> {
        cells_per_page(bytes).into_iter().flatten().collect()
    }

    #[test]
    fn test_each_line_becomes_one_cell() {
        let long = "revenue growth ".repeat(30);
        let long = long.trim_end();
        let text = format!("Marketing Plan\n\nIntroduction\n{}\nConclusion", long);

        let artifact = PdfExporter::default()
            .export(&text, "MarketingPlan.pdf")
            .unwrap();
        assert_eq!(artifact.cells, 5);
        assert_eq!(artifact.pages, 1);

        let cells = cells_of(&artifact.bytes);
        assert_eq!(
            cells,
            vec![
                "Marketing Plan".to_string(),
                String::new(),
                "Introduction".to_string(),
                long.to_string(),
                "Conclusion".to_string(),
            ]
        );
    }

    #[test]
    fn test_long_text_spills_onto_new_pages() {
        let text = (0..200).map(|i| format!("row {}", i)).collect::<Vec<_>>().join("\n");
        let artifact = PdfExporter::default().export(&text, "WebReport.pdf").unwrap();
        assert_eq!(artifact.cells, 200);
        assert!(artifact.pages >= 4);
        assert_eq!(cells_of(&artifact.bytes).len(), 200);
    }

    #[test]
    fn test_line_at_page_bottom_opens_on_next_page() {
        let text = (0..60).map(|i| format!("row {}", i)).collect::<Vec<_>>().join("\n");
        let artifact = PdfExporter::default().export(&text, "WebReport.pdf").unwrap();
        assert_eq!(artifact.cells, 60);
        assert_eq!(artifact.pages, 2);

        let pages = cells_per_page(&artifact.bytes);
        assert_eq!(pages[0].len() + pages[1].len(), 60);
        assert_eq!(pages[0].last().unwrap(), &format!("row {}", pages[0].len() - 1));
        assert_eq!(pages[1][0], format!("row {}", pages[0].len()));
        assert!(pages.iter().flatten().all(|cell| !cell.is_empty()));
    }

    #[test]
    fn test_wrapped_line_is_kept_on_one_page() {
        let long = "revenue growth ".repeat(20);
        let long = long.trim_end();
        let mut lines = (0..52).map(|i| format!("row {}", i)).collect::<Vec<_>>();
        lines.push(long.to_string());

        let artifact = PdfExporter::default()
            .export(&lines.join("\n"), "MarketingPlan.pdf")
            .unwrap();
        assert_eq!(artifact.cells, 53);

        let pages = cells_per_page(&artifact.bytes);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 52);
        assert_eq!(pages[1], vec![long.to_string()]);
    }

    #[test]
    fn test_line_taller_than_a_page_continues_on_next() {
        let long = "revenue growth ".repeat(400);
        let long = long.trim_end();
        let artifact = PdfExporter::default().export(long, "WebReport.pdf").unwrap();
        assert_eq!(artifact.cells, 1);
        assert_eq!(artifact.pages, 2);

        let pages = cells_per_page(&artifact.bytes);
        assert_eq!(pages[0].len(), 1);
        assert_eq!(pages[1].len(), 1);
        assert_eq!(format!("{} {}", pages[0][0], pages[1][0]), long);
    }

    #[test]
    fn test_empty_text_is_one_empty_cell() {
        let artifact = PdfExporter::default().export("", "WebReport.pdf").unwrap();
        assert_eq!(artifact.cells, 1);
        assert_eq!(cells_of(&artifact.bytes), vec![String::new()]);
    }

    #[test]
    fn test_typographic_punctuation_is_encoded() {
        assert_eq!(
            encode_win_ansi("“Q4” – café…", 1).unwrap(),
            vec![0x93, b'Q', b'4', 0x94, b' ', 0x96, b' ', b'c', b'a', b'f', 0xe9, 0x85]
        );
    }

    #[test]
    fn test_control_characters_print_as_spaces() {
        assert_eq!(encode_win_ansi("page\u{c}break\tend", 1).unwrap(), b"page break end");
        let artifact = PdfExporter::default()
            .export("Summary\u{c}\nNext\u{7}", "WebReport.pdf")
            .unwrap();
        assert_eq!(cells_of(&artifact.bytes), vec!["Summary ", "Next "]);
    }

    #[test]
    fn test_unencodable_character_is_export_error() {
        let err = PdfExporter::default()
            .export("fine\nprofit 📈", "MarketingPlan.pdf")
            .unwrap_err();
        assert_eq!(err, ExportError::Unencodable { ch: '📈', line: 2 });
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let word = vec![b'W'; 100];
        let rows = wrap(&word, 100.0, 12.0);
        assert!(rows.len() > 1);
        assert_eq!(rows.iter().map(Vec::len).sum::<usize>(), 100);
    }

    #[test]
    fn test_payload_carries_digest_and_mime() {
        let artifact = PdfExporter::default().export("hello", "WebReport.pdf").unwrap();
        let payload = artifact.to_payload();
        assert_eq!(payload.mime_type, "application/pdf");
        assert_eq!(payload.sha256.len(), 64);
        assert_eq!(payload.filename, "WebReport.pdf");
    }
}
