//! The chat session: conversation state plus the single-flight orchestrator.
//!
//! [`ChatSession`] owns the three pieces of state the engine is built
//! around — the append-only [`ConversationLog`], the one-shot
//! [`PendingContext`] buffer, and the [`RequestState`] machine — and is the
//! only place they are mutated. Everything else (extraction, payload
//! building, the remote call) is a pipeline stage the session sequences.
//!
//! ## Single flight
//!
//! At most one completion request is in flight at a time. The state machine
//! has exactly two transitions: `send` moves `Idle → AwaitingReply`, the
//! reply (or failure) moves `AwaitingReply → Idle`. A `send` attempted in
//! the awaiting state is rejected, not queued.
//!
//! ## Locking
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await: `send` takes the lock twice (once to admit the request and build
//! the payload, once to append the reply) and runs the network call in
//! between with no lock at all. The request-state flag, not the mutex, is
//! what serialises sends.

use crate::config::ChatConfig;
use crate::context::PendingContext;
use crate::conversation::{ConversationLog, FileMeta, Role, Turn};
use crate::error::{ChatError, FileError};
use crate::pipeline::completion::{CompletionClient, GeminiClient};
use crate::pipeline::extract::{extract_batch, BatchExtraction, SourceFile};
use crate::pipeline::payload::build_payload;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Whether a completion request is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingReply,
}

/// Result of a [`ChatSession::send`] call.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// A precondition failed (blank input, or a request already in flight).
    /// Nothing was appended and no state changed.
    Rejected,
    /// The round trip completed; this is the assistant turn that was
    /// appended (which may carry an error message rather than a reply).
    Replied(Turn),
}

impl SendOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SendOutcome::Rejected)
    }
}

/// Result of a [`ChatSession::attach`] call.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// Summary metadata of the files that parsed, in upload order. Each has
    /// a matching file-summary turn in the log.
    pub attached: Vec<FileMeta>,
    /// Files that were skipped, with the reason. These produce no turn and
    /// no corpus contribution.
    pub failures: Vec<FileError>,
}

struct SessionState {
    log: ConversationLog,
    pending: PendingContext,
    request: RequestState,
}

/// A single conversation against a completion backend.
pub struct ChatSession {
    state: Mutex<SessionState>,
    client: Arc<dyn CompletionClient>,
}

impl ChatSession {
    /// Create a session over an explicit completion client. This is the
    /// constructor tests use to substitute a scripted backend.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                log: ConversationLog::new(),
                pending: PendingContext::new(),
                request: RequestState::Idle,
            }),
            client,
        }
    }

    /// Create a session talking to the configured Gemini endpoint.
    pub fn connect(config: &ChatConfig) -> Result<Self, ChatError> {
        Ok(Self::new(Arc::new(GeminiClient::new(config)?)))
    }

    fn locked(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state poisoned")
    }

    /// Attach a batch of PDF files to the conversation.
    ///
    /// Each file that parses contributes a file-summary turn (in upload
    /// order) and a block in the shared corpus; the trimmed corpus
    /// overwrites any unconsumed pending context. Files that fail to parse
    /// are reported in the outcome and skipped. An unavailable PDF engine
    /// fails the whole batch with no state change. Zero files is a no-op.
    pub async fn attach(&self, files: Vec<SourceFile>) -> Result<ExtractionOutcome, ChatError> {
        if files.is_empty() {
            return Ok(ExtractionOutcome::default());
        }

        let batch = extract_batch(files).await?;
        Ok(self.record_extraction(batch))
    }

    /// Record an extraction performed elsewhere.
    ///
    /// Appends one file-summary turn per extracted file in batch order and
    /// overwrites the pending context with the batch corpus. Normally
    /// called through [`attach`](ChatSession::attach); exposed so callers
    /// with their own extraction capability can feed the session directly.
    pub fn record_extraction(&self, batch: BatchExtraction) -> ExtractionOutcome {
        let corpus = batch.corpus();

        let mut state = self.locked();
        let mut outcome = ExtractionOutcome {
            attached: Vec::with_capacity(batch.files.len()),
            failures: batch.failures,
        };
        for file in batch.files {
            state.log.append_file_summary(file.meta.clone());
            outcome.attached.push(file.meta);
        }
        state.pending.set(corpus);

        info!(
            "Attached {} file(s), {} failed; corpus pending: {}",
            outcome.attached.len(),
            outcome.failures.len(),
            !state.pending.is_empty()
        );
        outcome
    }

    /// Send a user message and wait for the assistant's reply.
    ///
    /// Blank input, or a call made while a request is already in flight,
    /// returns [`SendOutcome::Rejected`] without touching any state.
    /// Otherwise the trimmed text is appended as a user turn, the pending
    /// corpus (if any) is drained into this request only, and the reply —
    /// or a human-readable failure message — is appended as the assistant
    /// turn before the session returns to idle.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SendOutcome::Rejected;
        }

        let payload = {
            let mut state = self.locked();
            if state.request == RequestState::AwaitingReply {
                debug!("Rejecting send: a request is already in flight");
                return SendOutcome::Rejected;
            }
            state.log.append_text(Role::User, trimmed);
            state.request = RequestState::AwaitingReply;
            let corpus = state.pending.drain();
            build_payload(state.log.snapshot(), corpus.as_deref())
        };

        let content = match self.client.complete(&payload).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Completion failed: {:?}", e);
                e.to_string()
            }
        };

        // A clear() may have emptied the log while the call was in flight;
        // the late reply is still appended (it never resurrects the user
        // turn that preceded it), and the state returns to idle either way.
        let mut state = self.locked();
        let turn = state.log.append_text(Role::Assistant, content).clone();
        state.request = RequestState::Idle;
        SendOutcome::Replied(turn)
    }

    /// Reset the session: empty log, empty pending buffer, idle state.
    ///
    /// Clearing does not abort an in-flight request — the send already left
    /// the orchestrator. Its reply will be appended to the now-empty log
    /// when it arrives.
    pub fn clear(&self) {
        let mut state = self.locked();
        state.log.clear();
        state.pending.clear();
        state.request = RequestState::Idle;
    }

    /// An owned copy of the full conversation, in creation order.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.locked().log.snapshot().to_vec()
    }

    pub fn turn_count(&self) -> usize {
        self.locked().log.len()
    }

    /// True while a completion request is in flight.
    pub fn is_awaiting_reply(&self) -> bool {
        self.locked().request == RequestState::AwaitingReply
    }

    /// True when an extracted corpus is waiting for the next send.
    pub fn has_pending_context(&self) -> bool {
        !self.locked().pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::completion::CompletionError;
    use crate::pipeline::payload::PayloadPart;
    use async_trait::async_trait;

    struct CannedClient(&'static str);

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, _payload: &[PayloadPart]) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClient(u16);

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _payload: &[PayloadPart]) -> Result<String, CompletionError> {
            Err(CompletionError::Status(self.0))
        }
    }

    #[tokio::test]
    async fn round_trip_appends_user_then_assistant() {
        let session = ChatSession::new(Arc::new(CannedClient("Hi there")));
        let outcome = session.send("Hello").await;

        assert!(!outcome.is_rejected());
        let turns = session.snapshot();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Hello");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Hi there");
        assert!(!session.is_awaiting_reply());
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_state_change() {
        let session = ChatSession::new(Arc::new(CannedClient("unused")));
        assert!(session.send("   \n\t ").await.is_rejected());
        assert_eq!(session.turn_count(), 0);
        assert!(!session.is_awaiting_reply());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_appending() {
        let session = ChatSession::new(Arc::new(CannedClient("ok")));
        session.send("  padded  ").await;
        assert_eq!(session.snapshot()[0].content, "padded");
    }

    #[tokio::test]
    async fn remote_failure_becomes_an_assistant_turn() {
        let session = ChatSession::new(Arc::new(FailingClient(500)));
        let outcome = session.send("Hello").await;

        match outcome {
            SendOutcome::Replied(turn) => {
                assert_eq!(turn.content, "API request failed with status 500");
                assert_eq!(turn.role, Role::Assistant);
            }
            SendOutcome::Rejected => panic!("send should not be rejected"),
        }
        assert!(!session.is_awaiting_reply());
    }

    #[tokio::test]
    async fn clear_resets_log_buffer_and_state() {
        let session = ChatSession::new(Arc::new(CannedClient("ok")));
        session.send("one").await;
        session.clear();
        assert_eq!(session.turn_count(), 0);
        assert!(!session.has_pending_context());
        assert!(!session.is_awaiting_reply());
    }
}
