//! Append-only transcript accumulation with duplicate suppression

use crate::domain::transcription::TranscriptEvent;

/// Accumulated transcript text for a recording session.
///
/// Only final fragments are folded in. Each accepted fragment is trimmed
/// and appended with one trailing space. Empty fragments and fragments
/// identical to the immediately preceding accepted fragment are ignored
/// (the provider may emit the same final twice).
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    text: String,
    last_fragment: String,
}

impl TranscriptBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated transcript text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of whitespace-separated words in the transcript
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Fold a transcript event into the buffer.
    /// Non-final events are discarded. Returns true if text was appended.
    pub fn fold(&mut self, event: &TranscriptEvent) -> bool {
        if !event.is_final() {
            return false;
        }
        self.push_final(event.text())
    }

    /// Apply the merge rule to one final fragment.
    /// Returns true if the fragment was accepted and appended.
    pub fn push_final(&mut self, raw: &str) -> bool {
        let fragment = raw.trim();
        if fragment.is_empty() {
            return false;
        }
        if fragment == self.last_fragment {
            return false;
        }
        self.text.push_str(fragment);
        self.text.push(' ');
        self.last_fragment = fragment.to_string();
        true
    }

    /// Forget the last accepted fragment. Called at the start of every
    /// new session so a fragment repeated across sessions is not dropped.
    pub fn reset_dedup(&mut self) {
        self.last_fragment.clear();
    }

    /// Clear the accumulated text and the duplicate-suppression memory
    pub fn clear(&mut self) {
        self.text.clear();
        self.last_fragment.clear();
    }
}
