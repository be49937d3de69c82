//! Streaming transcription adapters

mod deepgram;

pub use deepgram::{DeepgramConfig, DeepgramLink};
