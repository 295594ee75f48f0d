//! Pipeline stages between an upload event and an assistant reply.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different completion backend) without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ (summary turns + pending corpus)
//!                      │
//! send ──▶ payload ──▶ completion ──▶ reply turn
//! ```
//!
//! 1. [`extract`]    — parse uploaded PDF bytes into per-file summaries and
//!    the shared corpus; runs in `spawn_blocking` because pdfium is not
//!    async-safe
//! 2. [`payload`]    — pure projection of the conversation log plus the
//!    drained corpus into the ordered request body
//! 3. [`completion`] — drive the remote call and shape its reply or
//!    failure; the only stage with network I/O

pub mod completion;
pub mod extract;
pub mod payload;
