//! Transcription value objects

mod event;

pub use event::TranscriptEvent;
