//! Interactive push-to-talk app runner

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::ports::ConfigStore;
use crate::application::session::{SessionController, SessionError, SessionEvent};
use crate::domain::config::AppConfig;
use crate::infrastructure::capture::CpalCapture;
use crate::infrastructure::config::XdgConfigStore;
use crate::infrastructure::transcription::{DeepgramConfig, DeepgramLink};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    let env_config = AppConfig {
        api_key: env::var("DEEPGRAM_API_KEY").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Run the interactive push-to-talk loop
pub async fn run_interactive(config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    // refuse to start without a credential; the microphone and network
    // are never touched in this case
    let api_key = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => key.to_string(),
        None => {
            presenter.error(&SessionError::MissingApiKey.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let mut deepgram = DeepgramConfig::new(api_key);
    deepgram.model = config.model_or_default().to_string();
    deepgram.language = config.language_or_default().to_string();
    deepgram.punctuate = config.punctuate_or_default();
    deepgram.interim_results = config.interim_results_or_default();

    let capture = Arc::new(CpalCapture::new());
    let link = Arc::new(DeepgramLink::new(deepgram));
    let (controller, mut events) = SessionController::new(capture, link);
    let controller = Arc::new(controller);

    // render task: transcripts, failures, and the end-of-session summary
    let render_controller = Arc::clone(&controller);
    let render = tokio::spawn(async move {
        let renderer = Presenter::new();
        let mut was_recording = false;
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::TranscriptChanged(text) => {
                    renderer.transcript(&text);
                }
                SessionEvent::Error(message) => {
                    renderer.error(&message);
                }
                SessionEvent::RecordingStateChanged(true) => {
                    was_recording = true;
                }
                SessionEvent::RecordingStateChanged(false) => {
                    if was_recording {
                        was_recording = false;
                        renderer.info(&format!(
                            "Recording stopped ({} words)",
                            render_controller.word_count()
                        ));
                    }
                }
            }
        }
    });

    presenter.info("Press Enter to start or stop recording. Type 'clear' to discard the transcript, 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    // stdin closed
                    Ok(None) => break,
                    Err(e) => {
                        presenter.error(&format!("Failed to read input: {}", e));
                        break;
                    }
                };

                match line.trim() {
                    "" => toggle(&controller, &mut presenter).await,
                    "clear" => controller.clear_transcript(),
                    "quit" | "exit" | "q" => break,
                    other => {
                        presenter.warn(&format!("Unknown command '{}'", other));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    controller.stop().await;
    // give the render task a moment to drain the final events
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    render.abort();

    let text = controller.transcript();
    if !text.trim().is_empty() {
        presenter.output(text.trim_end());
    }

    ExitCode::from(EXIT_SUCCESS)
}

async fn toggle<C, L>(controller: &SessionController<C, L>, presenter: &mut Presenter)
where
    C: crate::application::ports::AudioCapture + 'static,
    L: crate::application::ports::TranscriptionLink + 'static,
{
    if controller.is_recording() {
        controller.stop().await;
        return;
    }

    presenter.start_spinner("Starting...");
    match controller.start().await {
        Ok(true) => presenter.spinner_success("Recording - press Enter to stop"),
        Ok(false) => presenter.stop_spinner(),
        Err(e) => presenter.spinner_fail(&e.to_string()),
    }
}
