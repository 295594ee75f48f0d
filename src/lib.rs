//! # pdfchat
//!
//! Chat with a language model, optionally grounded in the text of uploaded
//! PDF documents.
//!
//! ## Why this crate?
//!
//! Bolting document context onto a chat loop is easy to get subtly wrong:
//! stale context re-sent on every turn, context attached to the wrong
//! message, or two concurrent requests interleaving their replies. This
//! crate centres on the orchestration engine that makes those mistakes
//! impossible by construction — an append-only conversation log, a one-shot
//! context buffer that drains into exactly one request, and a two-state
//! request machine that admits a single in-flight call.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Extract   per-page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 2. Record    one file-summary turn per file + shared pending corpus
//!  │
//! user text
//!  ├─ 3. Payload   log minus file summaries, corpus on the final turn only
//!  ├─ 4. Complete  one generateContent call (single-flight)
//!  └─ 5. Append    reply — or a readable failure message — as a turn
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfchat::{ChatConfig, ChatSession, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChatConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY").unwrap_or_default())
//!         .build()?;
//!     let session = ChatSession::connect(&config)?;
//!
//!     let bytes = std::fs::read("report.pdf")?;
//!     session.attach(vec![SourceFile::new("report.pdf", bytes)]).await?;
//!
//!     session.send("Summarize the attached report.").await;
//!     for turn in session.snapshot() {
//!         println!("{:?}: {}", turn.role, turn.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfchat` binary (clap + anyhow + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfchat = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod pipeline;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ChatConfig, ChatConfigBuilder, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use conversation::{ConversationLog, FileMeta, Role, Turn, TurnKind};
pub use error::{ChatError, FileError};
pub use pipeline::completion::{CompletionClient, CompletionError, GeminiClient, UNRECOGNIZED_REPLY};
pub use pipeline::extract::{
    extract_batch, human_size_label, BatchExtraction, ExtractedFile, SourceFile,
};
pub use pipeline::payload::{build_payload, PayloadPart, PayloadRole, CONTEXT_MARKER};
pub use session::{ChatSession, ExtractionOutcome, RequestState, SendOutcome};
