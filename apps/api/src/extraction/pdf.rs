//! PDF page-text strategies.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use crate::extraction::PageTextStrategy;

/// Layout-aware extraction via `pdf-extract`. The parser panics on some
/// malformed inputs, so panics are caught and reported as errors.
pub struct PdfExtractStrategy;

impl PageTextStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn page_texts(&self, path: &Path) -> Result<Vec<String>, String> {
        catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_by_pages(path)))
            .map_err(|_| "pdf-extract panicked while reading the document".to_string())?
            .map_err(|e| e.to_string())
    }
}

/// Plain per-page text from the content streams via `lopdf`.
pub struct LopdfStrategy;

impl PageTextStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn page_texts(&self, path: &Path) -> Result<Vec<String>, String> {
        let document = lopdf::Document::load(path).map_err(|e| e.to_string())?;
        document
            .get_pages()
            .keys()
            .map(|&page_number| {
                document
                    .extract_text(&[page_number])
                    .map_err(|e| format!("page {page_number}: {e}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn not_a_pdf() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is plain text, not a PDF").unwrap();
        file
    }

    #[test]
    fn test_lopdf_rejects_non_pdf_bytes() {
        let file = not_a_pdf();
        assert!(LopdfStrategy.page_texts(file.path()).is_err());
    }

    #[test]
    fn test_pdf_extract_rejects_non_pdf_bytes_without_panicking() {
        let file = not_a_pdf();
        assert!(PdfExtractStrategy.page_texts(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/definitely/missing/resume.pdf");
        assert!(LopdfStrategy.page_texts(path).is_err());
        assert!(PdfExtractStrategy.page_texts(path).is_err());
    }
}
