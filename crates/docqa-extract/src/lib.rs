//! Turns uploaded files into raw document text.
//!
//! PDF goes through `pdf-extract`; DOCX and PPTX are read straight out of
//! their zip containers with `quick-xml`. Plain text and markdown are read
//! as-is. A supported file that fails to parse yields an empty string so the
//! pipeline reports it as an extraction failure rather than an I/O error.

use std::path::Path;

use docqa_core::traits::TextExtractor;
use docqa_core::{Error, Result};

pub mod office;

/// File kinds the extractor understands, keyed by lower-cased extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Pptx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "txt" | "md" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// `pdf-extract` panics on some malformed files; a panic counts as a read
/// failure like any other.
fn pdf_text(path: &Path) -> anyhow::Result<String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(parsed) => parsed.map_err(|e| anyhow::anyhow!("pdf: {e}")),
        Err(_) => anyhow::bail!("pdf: parser panicked"),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

        let parsed = match format {
            DocumentFormat::Pdf => pdf_text(path),
            DocumentFormat::Docx => office::docx_text(path),
            DocumentFormat::Pptx => office::pptx_text(path),
            DocumentFormat::PlainText => std::fs::read(path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(anyhow::Error::from),
        };

        match parsed {
            Ok(text) => {
                tracing::debug!(path = %path.display(), ?format, chars = text.len(), "extracted text");
                Ok(text)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), ?format, error = %e, "failed to read document");
                Ok(String::new())
            }
        }
    }
}
