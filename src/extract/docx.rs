//! DOCX text extraction using docx-rs.

use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use super::ExtractError;

/// Concatenate the text of every body paragraph, in document order, with no separator.
///
/// Tables, section properties and other non-paragraph children are ignored.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            text.push_str(&paragraph_text(p));
        }
    }
    Ok(text)
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run_text(&mut text, r),
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        push_run_text(&mut text, r);
                    }
                }
            }
            _ => {}
        }
    }

    text
}

fn push_run_text(text: &mut String, run: &docx_rs::Run) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(docx: Docx) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_paragraphs_concatenate_without_separator() {
        let bytes = build_docx(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Hello")))
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("World"))),
        );
        assert_eq!(extract_docx_text(&bytes).unwrap(), "HelloWorld");
    }

    #[test]
    fn test_runs_tabs_and_empty_paragraphs() {
        let bytes = build_docx(
            Docx::new()
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("Total:"))
                        .add_run(Run::new().add_tab().add_text("42")),
                )
                .add_paragraph(Paragraph::new())
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("EUR"))),
        );
        assert_eq!(extract_docx_text(&bytes).unwrap(), "Total:\t42EUR");
    }

    #[test]
    fn test_empty_document_is_empty_text() {
        let bytes = build_docx(Docx::new());
        assert_eq!(extract_docx_text(&bytes).unwrap(), "");
    }

    #[test]
    fn test_invalid_docx() {
        assert!(extract_docx_text(b"not a zip archive").is_err());
    }
}
