//! One-shot holding area for extracted PDF text.
//!
//! The buffer carries the corpus from an upload to exactly one outgoing
//! request: a successful extraction overwrites it, the next send drains it,
//! and a drained value can never be observed twice. This is what keeps
//! document context out of the permanent conversation history — the corpus
//! rides along on a single request and is gone.

/// Pending corpus buffer. At most one value; an empty string is the empty
/// state (extracted corpora are trimmed, so a non-empty value always has
/// visible content).
#[derive(Debug, Default)]
pub struct PendingContext {
    corpus: String,
}

impl PendingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the buffer unconditionally. A prior unconsumed value is
    /// discarded, never merged.
    pub fn set(&mut self, corpus: impl Into<String>) {
        self.corpus = corpus.into();
    }

    /// Take the current value and reset to empty in the same step.
    /// Returns `None` when nothing was pending.
    pub fn drain(&mut self) -> Option<String> {
        if self.corpus.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.corpus))
        }
    }

    /// True iff no extraction has occurred since the last drain or clear.
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn clear(&mut self) {
        self.corpus.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_value_exactly_once() {
        let mut buf = PendingContext::new();
        buf.set("corpus text");
        assert!(!buf.is_empty());
        assert_eq!(buf.drain().as_deref(), Some("corpus text"));
        assert!(buf.is_empty());
        assert_eq!(buf.drain(), None);
    }

    #[test]
    fn set_overwrites_an_unconsumed_value() {
        let mut buf = PendingContext::new();
        buf.set("first upload");
        buf.set("second upload");
        assert_eq!(buf.drain().as_deref(), Some("second upload"));
    }

    #[test]
    fn empty_string_is_the_empty_state() {
        let mut buf = PendingContext::new();
        buf.set("");
        assert!(buf.is_empty());
        assert_eq!(buf.drain(), None);
    }

    #[test]
    fn clear_discards_pending_corpus() {
        let mut buf = PendingContext::new();
        buf.set("stale");
        buf.clear();
        assert_eq!(buf.drain(), None);
    }
}
