//! The conversation log: an ordered, append-only sequence of turns.
//!
//! The log is the single source of truth for both what a presenter renders
//! and what the orchestrator sends upstream. Turns are immutable once
//! appended; the only other mutation is a full clear. Ids are assigned from
//! a monotonic counter at append time and never reused, so iteration order
//! is always creation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// What a turn carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnKind {
    /// Ordinary message text.
    Text,
    /// A record of an attached PDF; `content` is empty and the details live
    /// in [`Turn::file_meta`].
    FileSummary,
}

/// Display metadata for an attached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Original file name as uploaded.
    pub name: String,
    /// Human-readable size, e.g. `"10.0 KB"`.
    pub size_label: String,
    /// Number of pages in the document.
    pub page_count: usize,
}

/// One immutable entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique, monotonically assigned at append time. Never reused.
    pub id: u64,
    pub role: Role,
    pub kind: TurnKind,
    /// UTF-8 message text; empty for file-summary turns.
    pub content: String,
    /// Assigned at append time; non-decreasing in insertion order.
    pub created_at: DateTime<Utc>,
    /// Present only when `kind == TurnKind::FileSummary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_meta: Option<FileMeta>,
}

impl Turn {
    /// Whether this turn records an attached file rather than message text.
    pub fn is_file_summary(&self) -> bool {
        self.kind == TurnKind::FileSummary
    }
}

/// Ordered, append-only log of [`Turn`]s.
///
/// Owned exclusively by the session; all mutation goes through
/// [`append_text`](ConversationLog::append_text),
/// [`append_file_summary`](ConversationLog::append_file_summary) and
/// [`clear`](ConversationLog::clear).
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    next_id: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text turn, assigning its id and timestamp. Never fails.
    pub fn append_text(&mut self, role: Role, content: impl Into<String>) -> &Turn {
        self.append(role, TurnKind::Text, content.into(), None)
    }

    /// Append a file-summary turn for an attached document.
    pub fn append_file_summary(&mut self, meta: FileMeta) -> &Turn {
        self.append(Role::User, TurnKind::FileSummary, String::new(), Some(meta))
    }

    fn append(
        &mut self,
        role: Role,
        kind: TurnKind,
        content: String,
        file_meta: Option<FileMeta>,
    ) -> &Turn {
        let id = self.next_id;
        self.next_id += 1;

        // The wall clock may step backwards; the log's timestamps must not.
        let now = Utc::now();
        let created_at = match self.turns.last() {
            Some(prev) if prev.created_at > now => prev.created_at,
            _ => now,
        };

        self.turns.push(Turn {
            id,
            role,
            kind,
            content,
            created_at,
            file_meta,
        });
        self.turns.last().expect("just pushed")
    }

    /// The full ordered sequence. Read-only; callers must not rely on
    /// indices remaining valid across a [`clear`](ConversationLog::clear).
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    /// Empty the log. Ids keep counting up so a turn appended after a clear
    /// can never collide with one a caller captured before it.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
