//! Error types for the pdfchat library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ChatError`] — **Fatal**: the operation cannot proceed at all
//!   (PDF engine not bound, invalid configuration). Returned as
//!   `Err(ChatError)` from the session-level entry points.
//!
//! * [`FileError`] — **Non-fatal**: a single uploaded file failed
//!   (corrupt bytes, a page whose text could not be read) but the rest of
//!   the batch is fine. Stored inside [`crate::session::ExtractionOutcome`]
//!   so callers can inspect partial success rather than losing the whole
//!   upload to one bad file.
//!
//! Remote-call failures are deliberately NOT here: the orchestrator folds
//! them into ordinary assistant turns (see
//! [`crate::pipeline::completion::CompletionError`]) so the conversation
//! log stays a complete linear record.

use thiserror::Error;

/// All fatal errors returned by the pdfchat library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::session::ExtractionOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The pdfium shared library could not be bound.
    ///
    /// Raised before any turn is appended or any buffer write occurs, so a
    /// missing engine leaves the session untouched.
    #[error(
        "PDF engine is not available: {0}\n\
Install the pdfium shared library, or point PDFIUM_LIB_PATH at an existing copy."
    )]
    PdfEngineUnavailable(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single uploaded file.
///
/// The file contributes neither a summary turn nor a corpus block; the
/// remaining files in the same batch still proceed.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The byte buffer could not be parsed as a PDF document.
    #[error("'{name}': unreadable PDF: {detail}")]
    Unreadable { name: String, detail: String },

    /// A page was parsed but its text content could not be read.
    #[error("'{name}': text extraction failed on page {page}: {detail}")]
    PageText {
        name: String,
        page: usize,
        detail: String,
    },
}

impl FileError {
    /// Name of the file this error belongs to.
    pub fn file_name(&self) -> &str {
        match self {
            FileError::Unreadable { name, .. } => name,
            FileError::PageText { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_unavailable_display_carries_hint() {
        let e = ChatError::PdfEngineUnavailable("library not found".into());
        let msg = e.to_string();
        assert!(msg.contains("library not found"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn file_error_display_names_the_file() {
        let e = FileError::PageText {
            name: "report.pdf".into(),
            page: 3,
            detail: "bad encoding".into(),
        };
        assert!(e.to_string().contains("report.pdf"));
        assert!(e.to_string().contains("page 3"));
        assert_eq!(e.file_name(), "report.pdf");
    }
}
