//! Text extraction from resume file formats

use crate::error::{Result, ResumeMatcherError};
use log::warn;
use pulldown_cmark::{Event, Parser, Tag};
use std::panic::{self, UnwindSafe};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Ok(pdf_bytes_to_text(&bytes, path))
    }
}

/// Scanned or encrypted PDFs have no usable text layer; they score as empty text.
fn pdf_bytes_to_text(bytes: &[u8], path: &Path) -> String {
    match decode_pdf(bytes, pdf_extract::extract_text_from_mem) {
        Ok(text) => text,
        Err(e) => {
            warn!("No text could be extracted from PDF '{}': {}", path.display(), e);
            String::new()
        }
    }
}

/// pdf-extract panics on some malformed documents instead of returning an error.
fn decode_pdf<F, E>(bytes: &[u8], decode: F) -> Result<String>
where
    F: FnOnce(&[u8]) -> std::result::Result<String, E> + UnwindSafe,
    E: std::fmt::Display,
{
    match panic::catch_unwind(|| decode(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ResumeMatcherError::PdfExtraction(e.to_string())),
        Err(_) => Err(ResumeMatcherError::PdfExtraction("decoder panicked on malformed input".to_string())),
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown))
    }
}

/// Flatten Markdown to one block per line, keeping list items as `- ` bullets.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak | Event::Rule => out.push('\n'),
            Event::Start(Tag::Item) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("- ");
            }
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_))
            | Event::End(Tag::TableRow) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(Tag::TableCell) => out.push(' '),
            _ => {}
        }
    }

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "-")
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_headings_and_bullets() {
        let md = "# Jane Doe\n\n## Experience\n\n* Led **backend** work on `payments`\n* Cut costs by 20%\n\nPlain paragraph\nwrapped line\n";
        let text = markdown_to_text(md);
        assert_eq!(
            text,
            "Jane Doe\nExperience\n- Led backend work on payments\n- Cut costs by 20%\nPlain paragraph wrapped line"
        );
    }

    #[test]
    fn test_nested_list_items_get_own_lines() {
        let md = "- Parent item\n  - Child item\n- Sibling\n";
        let text = markdown_to_text(md);
        assert_eq!(text, "- Parent item\n- Child item\n- Sibling");
    }

    #[test]
    fn test_undecodable_pdf_is_empty_text() {
        let text = pdf_bytes_to_text(b"not a pdf", Path::new("broken.pdf"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_pdf_decoder_panic_is_an_extraction_error() {
        let result = decode_pdf(b"%PDF-1.4 truncated", |_: &[u8]| -> std::result::Result<String, String> {
            panic!("index out of bounds")
        });
        assert!(matches!(result, Err(ResumeMatcherError::PdfExtraction(ref m)) if m.contains("panicked")));
    }

    #[test]
    fn test_pdf_decoder_error_is_an_extraction_error() {
        let result = decode_pdf(b"", |_: &[u8]| Err::<String, _>("no trailer"));
        assert!(matches!(result, Err(ResumeMatcherError::PdfExtraction(ref m)) if m == "no trailer"));
    }

    #[tokio::test]
    async fn test_plain_text_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Experience\n- Did things").unwrap();
        let text = PlainTextExtractor.extract(&path).await.unwrap();
        assert_eq!(text, "Experience\n- Did things");
    }
}
