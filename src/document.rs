//! Uploaded documents: a display name plus the raw bytes.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// The two formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub const EXTENSIONS: [&'static str; 2] = ["pdf", "docx"];

    /// Case-insensitive suffix match; `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        }
    }
}

#[derive(Clone)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }

    /// Read a document from disk, naming it after the file.
    pub fn from_path(file_path: impl AsRef<Path>) -> Result<Self> {
        let path = file_path.as_ref();

        if !path.exists() {
            bail!("Document file '{}' does not exist", path.display());
        }
        if !path.is_file() {
            bail!("'{}' is not a file", path.display());
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { name, bytes })
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(DocumentKind::from_name("invoice.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_name("Invoice.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_name("letter.DocX"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_name("notes.txt"), None);
        assert_eq!(DocumentKind::from_name("archive.pdf.zip"), None);
        assert_eq!(DocumentKind::from_name("pdf"), None);
        assert_eq!(DocumentKind::from_name("legacy.doc"), None);
    }

    #[test]
    fn test_from_path_uses_file_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan.pdf");
        fs::File::create(&path)?.write_all(b"%PDF-1.4")?;

        let doc = Document::from_path(&path)?;
        assert_eq!(doc.name, "scan.pdf");
        assert_eq!(doc.bytes, b"%PDF-1.4");
        assert_eq!(doc.kind(), Some(DocumentKind::Pdf));
        Ok(())
    }

    #[test]
    fn test_from_path_rejects_missing_and_directories() {
        assert!(Document::from_path("does/not/exist.pdf").is_err());
        let dir = tempfile::tempdir().unwrap();
        assert!(Document::from_path(dir.path()).is_err());
    }
}
