use lopdf::Document;

use super::ParseError;
use crate::models::ExtractedDocument;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extracts the text layer of every page, in page order.
///
/// A page whose text cannot be extracted (scanned image, unsupported font
/// encoding) contributes an empty string; the rest of the document is still read.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<ExtractedDocument, ParseError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ParseError::NotPdf);
    }

    let doc = Document::load_mem(bytes).map_err(|e| ParseError::Pdf(e.to_string()))?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ParseError::Encrypted);
    }

    let pages = doc.get_pages();
    let texts = pages
        .keys()
        .map(|&number| match doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("⚠️  PDF page {} has no extractable text: {}", number, e);
                String::new()
            }
        })
        .collect::<Vec<_>>();

    Ok(ExtractedDocument {
        text: join_pages(&texts),
        units: texts.len(),
    })
}

/// Every page is followed by a newline, empty pages included.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::PdfExporter;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, StringFormat, dictionary};

    #[test]
    fn test_join_pages_preserves_order_and_empty_pages() {
        assert_eq!(join_pages::<&str>(&[]), "");
        assert_eq!(join_pages(&["one", "", "three"]), "one\n\nthree\n");
    }

    #[test]
    fn test_rejects_non_pdf() {
        assert_eq!(
            extract_pdf_text(b"name,value\n").unwrap_err(),
            ParseError::NotPdf
        );
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        let err = extract_pdf_text(b"%PDF-1.5\n%garbage").unwrap_err();
        assert!(matches!(err, ParseError::Pdf(_)));
    }

    fn text_page(text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]
    }

    /// A page whose font operand is not a name, so its text cannot be decoded.
    fn unreadable_page() -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![5.into(), 12.into()]),
            Operation::new("Tj", vec![Object::string_literal("lost")]),
            Operation::new("ET", vec![]),
        ]
    }

    fn build_pdf(pages: Vec<Vec<Operation>>, encrypted: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for operations in pages {
            let content = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if encrypted {
            let encrypt_id = doc.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
                "O" => Object::string_literal(vec![0u8; 32]),
                "U" => Object::string_literal(vec![0u8; 32]),
                "P" => -4,
            });
            doc.trailer.set("Encrypt", encrypt_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_unreadable_page_contributes_empty_text() {
        let bytes = build_pdf(
            vec![text_page("alpha"), unreadable_page(), text_page("gamma")],
            false,
        );

        let document = extract_pdf_text(&bytes).unwrap();
        assert_eq!(document.units, 3);
        assert!(!document.text.contains("lost"));

        let alpha = document.text.find("alpha").unwrap();
        let gamma = document.text.find("gamma").unwrap();
        assert!(alpha < gamma);
        // alpha's own line, then the empty middle page, then gamma.
        assert_eq!(&document.text[alpha..gamma], "alpha\n\n\n");
    }

    #[test]
    fn test_encrypted_document_is_rejected() {
        let bytes = build_pdf(vec![text_page("secret")], true);
        assert_eq!(extract_pdf_text(&bytes).unwrap_err(), ParseError::Encrypted);
    }

    #[test]
    fn test_multi_page_text_comes_out_in_page_order() {
        let source = (1..=120)
            .map(|i| format!("line-{:03}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let artifact = PdfExporter::default()
            .export(&source, "Pages.pdf")
            .unwrap();
        assert!(artifact.pages >= 3);

        let document = extract_pdf_text(&artifact.bytes).unwrap();
        assert_eq!(document.units, artifact.pages);

        let first = document.text.find("line-001").unwrap();
        let middle = document.text.find("line-060").unwrap();
        let last = document.text.find("line-120").unwrap();
        assert!(first < middle && middle < last);
    }
}
