//! Deepgram real-time transcription over WebSocket.
//!
//! Speaks the `/v1/listen` streaming protocol: raw 16-bit little-endian
//! PCM goes out as binary frames, transcript results come back as JSON
//! text frames. A close with code 1000 is treated as deliberate; any
//! other termination is reported through the error handler exactly once.

use crate::application::ports::{LinkError, LinkHandlers, TranscriptionLink};
use crate::domain::audio::{AudioFrame, SAMPLE_RATE};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

const DEFAULT_ENDPOINT: &str = "wss://api.deepgram.com/v1/listen";

const CLOSED_UNEXPECTEDLY: &str = "Connection closed unexpectedly. Please try again.";
const CONNECTION_ERROR: &str =
    "WebSocket connection error. Please check your API key and internet connection.";

/// Connection parameters for the listen endpoint
#[derive(Debug, Clone)]
pub struct DeepgramConfig {
    pub api_key: String,
    pub model: String,
    pub language: String,
    pub punctuate: bool,
    pub interim_results: bool,
    pub endpoint: String,
}

impl DeepgramConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "nova-2".to_string(),
            language: "en-US".to_string(),
            punctuate: true,
            interim_results: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Full listen URL including the audio format query parameters
    pub fn listen_url(&self) -> String {
        format!(
            "{}?model={}&language={}&punctuate={}&interim_results={}&encoding=linear16&sample_rate={}&channels=1",
            self.endpoint,
            self.model,
            self.language,
            self.punctuate,
            self.interim_results,
            SAMPLE_RATE,
        )
    }
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    channel: Option<Channel>,
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    speech_final: bool,
}

#[derive(Debug, Deserialize)]
struct Channel {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: String,
}

/// Extract (text, is_final) from one listen message.
/// Returns Ok(None) for messages carrying no transcript text, such as
/// metadata and utterance-end notifications.
fn parse_listen_message(raw: &str) -> Result<Option<(String, bool)>, serde_json::Error> {
    let response: ListenResponse = serde_json::from_str(raw)?;
    let Some(channel) = response.channel else {
        return Ok(None);
    };
    let Some(alternative) = channel.alternatives.into_iter().next() else {
        return Ok(None);
    };
    if alternative.transcript.is_empty() {
        return Ok(None);
    }
    let is_final = response.is_final || response.speech_final;
    Ok(Some((alternative.transcript, is_final)))
}

/// Shared state of one live connection
struct ConnState {
    connected: AtomicBool,
    closing: AtomicBool,
    outbound: UnboundedSender<Message>,
}

/// WebSocket adapter for the Deepgram listen endpoint
pub struct DeepgramLink {
    config: DeepgramConfig,
    conn: Mutex<Option<Arc<ConnState>>>,
}

impl DeepgramLink {
    pub fn new(config: DeepgramConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    fn current(&self) -> Option<Arc<ConnState>> {
        self.conn.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionLink for DeepgramLink {
    async fn connect(&self, handlers: LinkHandlers) -> Result<(), LinkError> {
        let mut request = self
            .config
            .listen_url()
            .into_client_request()
            .map_err(|e| LinkError::ConnectionFailed(e.to_string()))?;
        let auth = HeaderValue::from_str(&format!("Token {}", self.config.api_key))
            .map_err(|_| LinkError::ConnectionFailed("API key is not valid header text".into()))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| LinkError::ConnectionFailed(e.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let state = Arc::new(ConnState {
            connected: AtomicBool::new(true),
            closing: AtomicBool::new(false),
            outbound,
        });
        *self.conn.lock().unwrap() = Some(Arc::clone(&state));

        // writer: forwards queued messages, closes the sink after a
        // Close frame has been sent
        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let is_close = matches!(message, Message::Close(_));
                if sink.send(message).await.is_err() {
                    break;
                }
                if is_close {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // reader: delivers transcripts and reports at most one failure
        let reader_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                match source.next().await {
                    Some(Ok(Message::Text(raw))) => match parse_listen_message(&raw) {
                        Ok(Some((text, is_final))) => {
                            (handlers.on_transcript)(&text, is_final);
                        }
                        Ok(None) => {}
                        Err(e) => log::warn!("unparseable listen message: {e}"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        reader_state.connected.store(false, Ordering::SeqCst);
                        let deliberate = reader_state.closing.load(Ordering::SeqCst);
                        let normal =
                            matches!(&frame, Some(f) if f.code == CloseCode::Normal);
                        if !deliberate && !normal {
                            (handlers.on_error)(CLOSED_UNEXPECTEDLY.to_string());
                        }
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::debug!("websocket read error: {e}");
                        reader_state.connected.store(false, Ordering::SeqCst);
                        if !reader_state.closing.load(Ordering::SeqCst) {
                            (handlers.on_error)(CONNECTION_ERROR.to_string());
                        }
                        break;
                    }
                    None => {
                        reader_state.connected.store(false, Ordering::SeqCst);
                        if !reader_state.closing.load(Ordering::SeqCst) {
                            (handlers.on_error)(CLOSED_UNEXPECTEDLY.to_string());
                        }
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    fn send_audio(&self, frame: &AudioFrame) -> Result<(), LinkError> {
        let Some(state) = self.current() else {
            return Err(LinkError::NotConnected);
        };
        if !state.connected.load(Ordering::SeqCst) {
            return Err(LinkError::NotConnected);
        }
        // a send failure here means the connection is mid-teardown; the
        // reader task reports it
        let _ = state.outbound.send(Message::Binary(frame.to_pcm_s16le()));
        Ok(())
    }

    async fn disconnect(&self) {
        let state = self.conn.lock().unwrap().take();
        if let Some(state) = state {
            state.closing.store(true, Ordering::SeqCst);
            state.connected.store(false, Ordering::SeqCst);
            let _ = state.outbound.send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "Client disconnect".into(),
            })));
        }
    }

    fn is_connected(&self) -> bool {
        self.current()
            .map(|s| s.connected.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_url_carries_audio_format() {
        let config = DeepgramConfig::new("key");
        let url = config.listen_url();
        assert!(url.starts_with("wss://api.deepgram.com/v1/listen?"));
        assert!(url.contains("model=nova-2"));
        assert!(url.contains("language=en-US"));
        assert!(url.contains("punctuate=true"));
        assert!(url.contains("interim_results=false"));
        assert!(url.contains("encoding=linear16"));
        assert!(url.contains("sample_rate=16000"));
        assert!(url.contains("channels=1"));
    }

    #[test]
    fn listen_url_reflects_overrides() {
        let mut config = DeepgramConfig::new("key");
        config.model = "nova-3".to_string();
        config.interim_results = true;
        let url = config.listen_url();
        assert!(url.contains("model=nova-3"));
        assert!(url.contains("interim_results=true"));
    }

    #[test]
    fn parses_final_transcript() {
        let raw = r#"{"channel":{"alternatives":[{"transcript":"hello world"}]},"is_final":true}"#;
        let parsed = parse_listen_message(raw).unwrap();
        assert_eq!(parsed, Some(("hello world".to_string(), true)));
    }

    #[test]
    fn speech_final_counts_as_final() {
        let raw =
            r#"{"channel":{"alternatives":[{"transcript":"done"}]},"speech_final":true}"#;
        let parsed = parse_listen_message(raw).unwrap();
        assert_eq!(parsed, Some(("done".to_string(), true)));
    }

    #[test]
    fn interim_transcript_is_not_final() {
        let raw = r#"{"channel":{"alternatives":[{"transcript":"hel"}]}}"#;
        let parsed = parse_listen_message(raw).unwrap();
        assert_eq!(parsed, Some(("hel".to_string(), false)));
    }

    #[test]
    fn empty_transcript_yields_nothing() {
        let raw = r#"{"channel":{"alternatives":[{"transcript":""}]},"is_final":true}"#;
        assert_eq!(parse_listen_message(raw).unwrap(), None);
    }

    #[test]
    fn metadata_message_yields_nothing() {
        let raw = r#"{"type":"Metadata","request_id":"abc"}"#;
        assert_eq!(parse_listen_message(raw).unwrap(), None);
    }

    #[test]
    fn malformed_message_is_an_error() {
        assert!(parse_listen_message("not json").is_err());
    }
}
