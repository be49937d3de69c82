//! Domain layer containing core business logic

pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod transcription;
