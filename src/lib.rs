//! Streamscribe - push-to-talk voice transcription in the terminal.
//!
//! Captures microphone audio, streams it to Deepgram's real-time listen
//! endpoint over WebSocket, and accumulates the returned transcript.
//! Organized hexagonally: `domain` holds the session and audio models,
//! `application` the ports and the session use case, `infrastructure`
//! the cpal and WebSocket adapters, and `cli` the terminal front end.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
