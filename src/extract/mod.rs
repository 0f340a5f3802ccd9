//! Plain-text extraction for uploaded documents.
//!
//! Dispatch is by file name suffix. Unsupported suffixes yield `Ok(None)`,
//! which callers treat as "skip this document"; an empty but valid document
//! yields `Ok(Some(String::new()))`.

pub mod docx;
pub mod pdf;

use thiserror::Error;

use crate::document::{Document, DocumentKind};

#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    #[error("failed to parse DOCX: {0}")]
    Docx(String),
}

/// Extract the full text of `document`, or `None` when its type is unsupported.
pub fn extract(document: &Document) -> Result<Option<String>, ExtractError> {
    let Some(kind) = document.kind() else {
        tracing::debug!(name = %document.name, "skipping unsupported document type");
        return Ok(None);
    };

    let text = match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(&document.bytes)?,
        DocumentKind::Docx => docx::extract_docx_text(&document.bytes)?,
    };

    tracing::debug!(
        name = %document.name,
        kind = kind.label(),
        bytes = document.bytes.len(),
        chars = text.chars().count(),
        "extracted document text"
    );
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_is_none_not_error() {
        let doc = Document::new("notes.txt", b"plain text".to_vec());
        assert!(matches!(extract(&doc), Ok(None)));
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        let pdf = Document::new("broken.pdf", b"not a pdf".to_vec());
        assert!(matches!(extract(&pdf), Err(ExtractError::Pdf(_))));

        let docx = Document::new("broken.docx", b"not a zip".to_vec());
        assert!(matches!(extract(&docx), Err(ExtractError::Docx(_))));
    }
}
