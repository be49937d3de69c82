//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// Streamscribe - push-to-talk voice transcription in the terminal
#[derive(Parser, Debug)]
#[command(name = "streamscribe")]
#[command(version)]
#[command(about = "Push-to-talk voice transcription using Deepgram real-time streaming")]
#[command(long_about = None)]
pub struct Cli {
    /// Transcription model
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Transcription language
    #[arg(short = 'l', long, value_name = "LANG")]
    pub language: Option<String>,

    /// Disable automatic punctuation
    #[arg(long)]
    pub no_punctuate: bool,

    /// Request interim (non-final) results from the provider
    #[arg(long)]
    pub interim_results: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "model",
    "language",
    "punctuate",
    "interim_results",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["streamscribe"]);
        assert!(cli.model.is_none());
        assert!(cli.language.is_none());
        assert!(!cli.no_punctuate);
        assert!(!cli.interim_results);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_model_and_language() {
        let cli = Cli::parse_from(["streamscribe", "-m", "nova-3", "-l", "de"]);
        assert_eq!(cli.model, Some("nova-3".to_string()));
        assert_eq!(cli.language, Some("de".to_string()));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from(["streamscribe", "--no-punctuate", "--interim-results"]);
        assert!(cli.no_punctuate);
        assert!(cli.interim_results);
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["streamscribe", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["streamscribe", "config", "set", "model", "nova-3"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "model");
            assert_eq!(value, "nova-3");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_key"));
        assert!(is_valid_config_key("model"));
        assert!(is_valid_config_key("interim_results"));
        assert!(!is_valid_config_key("invalid_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
