//! Microphone capture port

use crate::domain::audio::AudioFrame;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Callback invoked for each captured audio frame
pub type FrameCallback = Arc<dyn Fn(AudioFrame) + Send + Sync>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Microphone permission denied. Please allow microphone access.")]
    PermissionDenied,

    #[error("No microphone found. Please connect a microphone.")]
    DeviceNotFound,

    #[error("Failed to access microphone: {0}")]
    InitFailed(String),

    #[error("Audio capture not initialized. Call initialize() first.")]
    NotInitialized,
}

/// Port for acquiring the microphone and streaming mono 16 kHz frames
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Verify a usable input device exists and acquire the logical
    /// capture handle. Safe to call again after success (no-op).
    async fn initialize(&self) -> Result<(), CaptureError>;

    /// Begin streaming frames to the callback. Requires a prior
    /// successful `initialize`. Starting while already active is a no-op.
    fn start_capture(&self, on_frame: FrameCallback) -> Result<(), CaptureError>;

    /// Stop streaming and release the logical capture handle
    fn stop_capture(&self);

    /// Whether frames are currently being delivered
    fn is_active(&self) -> bool;
}
