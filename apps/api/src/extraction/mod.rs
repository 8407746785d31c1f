//! Document Text Extractor — turns an uploaded resume file into plain text.
//!
//! PDFs go through a primary page-by-page strategy and fall back to a simpler
//! one when the primary fails. DOCX files are read straight from their
//! `word/document.xml` part.
//!
//! Everything here is blocking; async callers wrap it in `spawn_blocking`.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

pub mod docx;
pub mod pdf;

use crate::extraction::pdf::{LopdfStrategy, PdfExtractStrategy};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

/// Formats the extractor understands. Legacy `.doc` is routed to the DOCX
/// reader, which rejects anything that is not an OOXML container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Maps a declared extension (`.pdf`, `pdf`, `.DOCX`, ...) to a format.
    /// No content sniffing is attempted.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        let normalized = extension.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "doc" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractionError::UnsupportedFormat(format!(".{normalized}"))),
        }
    }
}

/// A way of pulling per-page text out of a PDF.
pub trait PageTextStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the text of every page in order. Errors are plain messages;
    /// the extractor decides whether they are fatal.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, String>;
}

pub struct TextExtractor {
    pdf_primary: Box<dyn PageTextStrategy>,
    pdf_fallback: Box<dyn PageTextStrategy>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Box::new(PdfExtractStrategy), Box::new(LopdfStrategy))
    }
}

impl TextExtractor {
    pub fn new(
        pdf_primary: Box<dyn PageTextStrategy>,
        pdf_fallback: Box<dyn PageTextStrategy>,
    ) -> Self {
        Self {
            pdf_primary,
            pdf_fallback,
        }
    }

    /// Extracts trimmed plain text from `path`, interpreting it according to
    /// `declared_extension`. Empty output is a valid result.
    pub fn extract(&self, path: &Path, declared_extension: &str) -> Result<String, ExtractionError> {
        let format = DocumentFormat::from_extension(declared_extension)?;
        info!("Extracting text from {} as {:?}", path.display(), format);

        let text = match format {
            DocumentFormat::Pdf => self.extract_pdf(path)?,
            DocumentFormat::Docx => docx::extract_docx_text(path)
                .map_err(|e| ExtractionError::ExtractionFailed(format!("Failed to parse DOCX: {e}")))?,
        };

        Ok(text.trim().to_string())
    }

    /// Like `extract`, taking the declared extension from the file name.
    pub fn extract_path(&self, path: &Path) -> Result<String, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.extract(path, extension)
    }

    fn extract_pdf(&self, path: &Path) -> Result<String, ExtractionError> {
        match self.pdf_primary.page_texts(path) {
            Ok(pages) => Ok(join_pages(&pages)),
            Err(primary_error) => {
                warn!(
                    "PDF strategy '{}' failed ({}), falling back to '{}'",
                    self.pdf_primary.name(),
                    primary_error,
                    self.pdf_fallback.name()
                );
                self.pdf_fallback
                    .page_texts(path)
                    .map(|pages| join_pages(&pages))
                    .map_err(|e| ExtractionError::ExtractionFailed(format!("Failed to parse PDF: {e}")))
            }
        }
    }
}

/// Concatenates non-empty pages, each followed by a newline.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|page| !page.is_empty())
        .fold(String::new(), |mut text, page| {
            text.push_str(page);
            text.push('\n');
            text
        })
}
