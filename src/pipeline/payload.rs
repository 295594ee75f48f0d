//! Outgoing payload construction.
//!
//! [`build_payload`] is a pure projection of the conversation log plus an
//! optional drained corpus into the ordered request body. Keeping it free
//! of side effects means every ordering and injection rule in it can be
//! unit-tested without a session, a buffer, or a network in sight.
//!
//! Rules, in order:
//! 1. file-summary turns are excluded — their extracted text reaches the
//!    model only via the corpus injection, never as turns;
//! 2. roles map `user` → `user`, `assistant`/`system` → `model`;
//! 3. a non-empty corpus is appended (not prepended) to the text of the
//!    **last** element only, which is always the just-appended user turn.

use crate::conversation::{Role, Turn};
use serde::Serialize;

/// Marker inserted between the user's message and the injected corpus.
pub const CONTEXT_MARKER: &str = "\n\n---\nPDF Content:\n";

/// Wire-level role of a payload element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadRole {
    User,
    Model,
}

impl From<Role> for PayloadRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => PayloadRole::User,
            Role::Assistant | Role::System => PayloadRole::Model,
        }
    }
}

/// One element of the outgoing request, in conversation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadPart {
    pub role: PayloadRole,
    pub text: String,
}

/// Project the log (and an optional drained corpus) into the request body.
///
/// The payload is ephemeral: it exists for the duration of one remote call
/// and is never stored, so a corpus attached here never pollutes history.
pub fn build_payload(turns: &[Turn], corpus: Option<&str>) -> Vec<PayloadPart> {
    let mut payload: Vec<PayloadPart> = turns
        .iter()
        .filter(|t| !t.is_file_summary())
        .map(|t| PayloadPart {
            role: t.role.into(),
            text: t.content.clone(),
        })
        .collect();

    if let Some(corpus) = corpus.filter(|c| !c.is_empty()) {
        if let Some(last) = payload.last_mut() {
            last.text.push_str(CONTEXT_MARKER);
            last.text.push_str(corpus);
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationLog, FileMeta, Role};

    fn sample_log() -> ConversationLog {
        let mut log = ConversationLog::new();
        log.append_text(Role::User, "What is in this file?");
        log.append_file_summary(FileMeta {
            name: "doc.pdf".into(),
            size_label: "10.0 KB".into(),
            page_count: 2,
        });
        log.append_text(Role::Assistant, "Let me look.");
        log.append_text(Role::User, "Summarize");
        log
    }

    #[test]
    fn file_summaries_are_excluded() {
        let log = sample_log();
        let payload = build_payload(log.snapshot(), None);
        assert_eq!(payload.len(), 3);
        assert!(payload.iter().all(|p| !p.text.is_empty()));
    }

    #[test]
    fn roles_map_user_to_user_and_the_rest_to_model() {
        let mut log = ConversationLog::new();
        log.append_text(Role::System, "context");
        log.append_text(Role::User, "hi");
        log.append_text(Role::Assistant, "hello");

        let payload = build_payload(log.snapshot(), None);
        assert_eq!(payload[0].role, PayloadRole::Model);
        assert_eq!(payload[1].role, PayloadRole::User);
        assert_eq!(payload[2].role, PayloadRole::Model);
    }

    #[test]
    fn corpus_lands_on_the_last_element_only() {
        let log = sample_log();
        let payload = build_payload(log.snapshot(), Some("PAGE ONE\nPAGE TWO"));

        let last = payload.last().unwrap();
        assert!(last.text.starts_with("Summarize"));
        assert!(last
            .text
            .ends_with("\n\n---\nPDF Content:\nPAGE ONE\nPAGE TWO"));
        // Earlier elements are untouched.
        assert!(payload[..payload.len() - 1]
            .iter()
            .all(|p| !p.text.contains("PDF Content:")));
    }

    #[test]
    fn empty_corpus_injects_nothing() {
        let log = sample_log();
        let payload = build_payload(log.snapshot(), Some(""));
        assert!(payload.iter().all(|p| !p.text.contains(CONTEXT_MARKER)));
    }

    #[test]
    fn empty_log_yields_empty_payload_even_with_corpus() {
        let payload = build_payload(&[], Some("orphan corpus"));
        assert!(payload.is_empty());
    }
}
