//! Transcript event value object

/// One transcript fragment reported by the provider.
/// Final fragments are complete and will not be revised; non-final
/// (interim) fragments may still change and are discarded by the
/// default configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    text: String,
    is_final: bool,
}

impl TranscriptEvent {
    /// Create a transcript event
    pub fn new(text: impl Into<String>, is_final: bool) -> Self {
        Self {
            text: text.into(),
            is_final,
        }
    }

    /// The transcript text as received from the provider
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the provider asserts this fragment is complete
    pub fn is_final(&self) -> bool {
        self.is_final
    }
}
