//! PDF text extraction: uploaded byte buffers → summary metadata + corpus.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the whole batch onto a
//! dedicated blocking-pool thread so the async workers never stall on
//! CPU-heavy parsing.
//!
//! ## Why sequential?
//!
//! Files are processed one at a time, pages in page order. That bounds
//! memory to a single open document and makes the corpus deterministic:
//! blocks appear in upload order, pages in page order, every run.

use crate::conversation::FileMeta;
use crate::error::{ChatError, FileError};
use pdfium_render::prelude::*;
use tracing::{debug, warn};

/// An uploaded file: its display name and raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Extraction result for one file that parsed cleanly.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    /// Summary metadata for the file's conversation turn.
    pub meta: FileMeta,
    /// This file's contribution to the shared corpus, already framed with
    /// its `--- PDF: <name> ---` header.
    pub corpus_block: String,
}

/// Outcome of one upload batch: per-file successes in upload order, plus
/// the failures that were skipped.
#[derive(Debug, Default)]
pub struct BatchExtraction {
    pub files: Vec<ExtractedFile>,
    pub failures: Vec<FileError>,
}

impl BatchExtraction {
    /// The trimmed concatenation of all per-file blocks, in upload order.
    pub fn corpus(&self) -> String {
        self.files
            .iter()
            .map(|f| f.corpus_block.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Extract text from a batch of uploaded PDFs.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// A file that fails to parse is recorded in
/// [`BatchExtraction::failures`] and skipped; the rest of the batch still
/// proceeds. An unavailable PDF engine fails the whole batch before any
/// file is touched.
pub async fn extract_batch(files: Vec<SourceFile>) -> Result<BatchExtraction, ChatError> {
    if files.is_empty() {
        return Ok(BatchExtraction::default());
    }

    tokio::task::spawn_blocking(move || extract_batch_blocking(&files))
        .await
        .map_err(|e| ChatError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of batch extraction.
fn extract_batch_blocking(files: &[SourceFile]) -> Result<BatchExtraction, ChatError> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| ChatError::PdfEngineUnavailable(format!("{:?}", e)))?;
    let pdfium = Pdfium::new(bindings);

    let mut batch = BatchExtraction::default();

    for file in files {
        match extract_file(&pdfium, file) {
            Ok(extracted) => {
                debug!(
                    "Extracted '{}': {} pages, {} corpus bytes",
                    file.name,
                    extracted.meta.page_count,
                    extracted.corpus_block.len()
                );
                batch.files.push(extracted);
            }
            Err(e) => {
                warn!("Skipping '{}': {}", file.name, e);
                batch.failures.push(e);
            }
        }
    }

    Ok(batch)
}

/// Extract one file: page count, per-page text, and the corpus block.
fn extract_file(pdfium: &Pdfium, file: &SourceFile) -> Result<ExtractedFile, FileError> {
    let document = pdfium
        .load_pdf_from_byte_slice(&file.bytes, None)
        .map_err(|e| FileError::Unreadable {
            name: file.name.clone(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;

    let mut pages_text = String::new();
    for (index, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| FileError::PageText {
            name: file.name.clone(),
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        pages_text.push_str(&normalize_page_text(&text.all()));
        pages_text.push('\n');
    }

    Ok(ExtractedFile {
        meta: FileMeta {
            name: file.name.clone(),
            size_label: human_size_label(file.bytes.len() as u64),
            page_count,
        },
        corpus_block: corpus_block(&file.name, &pages_text),
    })
}

/// Join a page's extracted text fragments with single spaces.
///
/// pdfium reports text in layout fragments separated by line breaks; the
/// corpus wants one flowing line per page.
fn normalize_page_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Frame one file's page text as its block in the shared corpus.
fn corpus_block(name: &str, pages_text: &str) -> String {
    format!("\n--- PDF: {} ---\n{}\n", name, pages_text)
}

/// Human-readable size label: `B` under 1 KiB, one-decimal `KB` under
/// 1 MiB, one-decimal `MB` above.
pub fn human_size_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_label_thresholds() {
        assert_eq!(human_size_label(0), "0 B");
        assert_eq!(human_size_label(500), "500 B");
        assert_eq!(human_size_label(1023), "1023 B");
        assert_eq!(human_size_label(1024), "1.0 KB");
        assert_eq!(human_size_label(2048), "2.0 KB");
        assert_eq!(human_size_label(10240), "10.0 KB");
        assert_eq!(human_size_label(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn page_text_fragments_join_with_single_spaces() {
        let raw = "Heading\n  left column   \n\nright column\n";
        assert_eq!(
            normalize_page_text(raw),
            "Heading left column right column"
        );
        assert_eq!(normalize_page_text(""), "");
    }

    #[test]
    fn corpus_block_frames_the_file_name() {
        let block = corpus_block("doc.pdf", "page one\npage two\n");
        assert_eq!(block, "\n--- PDF: doc.pdf ---\npage one\npage two\n\n");
    }

    #[test]
    fn batch_corpus_is_trimmed_concatenation_in_order() {
        let batch = BatchExtraction {
            files: vec![
                ExtractedFile {
                    meta: FileMeta {
                        name: "a.pdf".into(),
                        size_label: "1.0 KB".into(),
                        page_count: 1,
                    },
                    corpus_block: corpus_block("a.pdf", "alpha\n"),
                },
                ExtractedFile {
                    meta: FileMeta {
                        name: "b.pdf".into(),
                        size_label: "1.0 KB".into(),
                        page_count: 1,
                    },
                    corpus_block: corpus_block("b.pdf", "beta\n"),
                },
            ],
            failures: vec![],
        };

        let corpus = batch.corpus();
        assert!(corpus.starts_with("--- PDF: a.pdf ---"));
        assert!(corpus.ends_with("beta"));
        assert!(corpus.find("a.pdf").unwrap() < corpus.find("b.pdf").unwrap());
    }

    #[test]
    fn zero_files_is_a_no_op() {
        let batch = tokio_test::block_on(extract_batch(Vec::new())).expect("empty batch");
        assert!(batch.files.is_empty());
        assert!(batch.failures.is_empty());
        assert!(batch.corpus().is_empty());
    }
}
