//! Streaming transcription port

use crate::domain::audio::AudioFrame;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Callback invoked for each transcript fragment: (text, is_final)
pub type TranscriptCallback = Arc<dyn Fn(&str, bool) + Send + Sync>;

/// Callback invoked when the link fails after connecting
pub type LinkErrorCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callbacks the adapter drives for the lifetime of one connection
#[derive(Clone)]
pub struct LinkHandlers {
    pub on_transcript: TranscriptCallback,
    pub on_error: LinkErrorCallback,
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Failed to connect to the transcription service: {0}")]
    ConnectionFailed(String),

    #[error("Not connected to the transcription service. Call connect() first.")]
    NotConnected,
}

/// Port for a bidirectional streaming transcription connection
#[async_trait]
pub trait TranscriptionLink: Send + Sync {
    /// Open the connection. Resolves once the transport is established;
    /// transcripts and post-connect failures arrive via the handlers.
    async fn connect(&self, handlers: LinkHandlers) -> Result<(), LinkError>;

    /// Send one audio frame. Fails if not connected.
    fn send_audio(&self, frame: &AudioFrame) -> Result<(), LinkError>;

    /// Close the connection deliberately. The error handler is not
    /// invoked for a close requested here.
    async fn disconnect(&self);

    /// Whether the connection is currently open
    fn is_connected(&self) -> bool;
}
