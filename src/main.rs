//! Streamscribe CLI entry point

use std::process::ExitCode;

use clap::Parser;

use streamscribe::cli::{
    app::{load_merged_config, run_interactive, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use streamscribe::domain::config::AppConfig;
use streamscribe::infrastructure::config::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args; API key comes from env/file only
    let cli_config = AppConfig {
        api_key: None,
        model: cli.model.clone(),
        language: cli.language.clone(),
        punctuate: if cli.no_punctuate { Some(false) } else { None },
        interim_results: if cli.interim_results { Some(true) } else { None },
    };

    let config = load_merged_config(cli_config).await;
    run_interactive(config).await
}
