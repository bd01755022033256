//! PDF text extraction
//!
//! Pages are read in document order. A page without an extractable text layer
//! (a pure scan, or a font lopdf cannot decode) contributes nothing. Page texts
//! are trimmed at the end and joined with a single newline.

use lopdf::Document;
use thiserror::Error;

/// Errors raised while reading a PDF
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Invalid PDF structure: {0}")]
    Parse(#[from] lopdf::Error),
}

/// Extracts the concatenated text of every page
///
/// # Returns
///
/// * `Ok(String)` - Page texts joined with `\n`; empty if no page has text
/// * `Err(PdfError)` - The bytes are not a readable PDF document
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PdfError> {
    let document = Document::load_mem(bytes)?;

    let mut page_texts = Vec::new();
    for page_number in document.get_pages().into_keys() {
        match document.extract_text(&[page_number]) {
            Ok(text) => {
                let text = text.trim_end();
                if !text.is_empty() {
                    page_texts.push(text.to_string());
                }
            }
            Err(e) => {
                tracing::debug!("No text layer on page {}: {}", page_number, e);
            }
        }
    }

    Ok(page_texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, ObjectId, Stream};

    /// Builds a PDF with one page per entry; `None` produces a page without text
    fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page_text in pages {
            let operations = match page_text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("save pdf");
        buf
    }

    #[test]
    fn test_two_pages_joined_with_newline() {
        let pdf = build_pdf(&[Some("Hello"), Some("World")]);
        assert_eq!(extract_pdf_text(&pdf).unwrap(), "Hello\nWorld");
    }

    #[test]
    fn test_page_without_text_contributes_nothing() {
        let pdf = build_pdf(&[Some("Hello"), None, Some("World")]);
        assert_eq!(extract_pdf_text(&pdf).unwrap(), "Hello\nWorld");
    }

    #[test]
    fn test_no_text_at_all_is_empty() {
        let pdf = build_pdf(&[None]);
        assert_eq!(extract_pdf_text(&pdf).unwrap(), "");
    }

    #[test]
    fn test_malformed_pdf_is_parse_error() {
        let result = extract_pdf_text(b"this is definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_truncated_pdf_is_parse_error() {
        let pdf = build_pdf(&[Some("Hello")]);
        let result = extract_pdf_text(&pdf[..20]);
        assert!(result.is_err());
    }
}
