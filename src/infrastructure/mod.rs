//! Infrastructure adapters for the application ports

pub mod capture;
pub mod config;
pub mod transcription;
