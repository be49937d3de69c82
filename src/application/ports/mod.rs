//! Ports implemented by infrastructure adapters

mod capture;
mod config;
mod link;

pub use capture::{AudioCapture, CaptureError, FrameCallback};
pub use config::ConfigStore;
pub use link::{LinkError, LinkErrorCallback, LinkHandlers, TranscriptCallback, TranscriptionLink};
