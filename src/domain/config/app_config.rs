//! Application configuration model

use serde::{Deserialize, Serialize};

/// Transcription model used when none is configured
pub const DEFAULT_MODEL: &str = "nova-2";

/// Transcription language used when none is configured
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Application configuration.
///
/// Every field is optional so that partial configurations from the file,
/// the environment, and the command line can be merged. Later sources
/// win on a per-field basis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deepgram API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Transcription model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Transcription language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Whether the provider should punctuate transcripts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punctuate: Option<bool>,

    /// Whether to request interim (non-final) results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interim_results: Option<bool>,
}

impl AppConfig {
    /// Configuration with every field unset
    pub fn empty() -> Self {
        Self::default()
    }

    /// Configuration holding the documented defaults
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            model: Some(DEFAULT_MODEL.to_string()),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            punctuate: Some(true),
            interim_results: Some(false),
        }
    }

    /// Merge another configuration on top of this one.
    /// Fields set in `other` replace fields in `self`.
    pub fn merge(mut self, other: AppConfig) -> Self {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.language.is_some() {
            self.language = other.language;
        }
        if other.punctuate.is_some() {
            self.punctuate = other.punctuate;
        }
        if other.interim_results.is_some() {
            self.interim_results = other.interim_results;
        }
        self
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn punctuate_or_default(&self) -> bool {
        self.punctuate.unwrap_or(true)
    }

    pub fn interim_results_or_default(&self) -> bool {
        self.interim_results.unwrap_or(false)
    }
}
