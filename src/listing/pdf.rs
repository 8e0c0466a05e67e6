//! PDF text extraction
//!
//! Produces one linearized text string per page. Layout is not preserved;
//! rows come out in whatever order the PDF backend yields them.

use super::ListingError;
use std::panic::{self, AssertUnwindSafe};

/// PDF magic bytes
const PDF_MAGIC: &[u8] = b"%PDF";
/// Maximum PDF file size (100 MB)
const MAX_PDF_SIZE: usize = 100 * 1024 * 1024;

/// Cheap structural checks before handing bytes to the PDF backend
pub fn validate_pdf(bytes: &[u8]) -> Result<(), ListingError> {
    if bytes.len() < 8 {
        return Err(ListingError::MalformedInput(
            "file too small to be a PDF".to_string(),
        ));
    }

    if bytes.len() > MAX_PDF_SIZE {
        return Err(ListingError::MalformedInput(format!(
            "PDF too large ({} MB). Maximum: {} MB",
            bytes.len() / (1024 * 1024),
            MAX_PDF_SIZE / (1024 * 1024)
        )));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ListingError::MalformedInput(
            "missing PDF header".to_string(),
        ));
    }

    Ok(())
}

/// Extract the text of every page, in document order
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ListingError> {
    validate_pdf(bytes)?;

    // pdf-extract panics on some malformed documents
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ListingError::MalformedInput("PDF backend crashed while reading text".to_string()))?
    .map_err(|e| ListingError::MalformedInput(format!("failed to extract text from PDF: {}", e)))?;

    if pages.is_empty() {
        return Err(ListingError::MalformedInput(
            "PDF contains no pages".to_string(),
        ));
    }

    log::info!("PDF: extracted text from {} pages", pages.len());
    Ok(pages)
}
