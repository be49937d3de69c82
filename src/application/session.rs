//! Push-to-talk session use case.
//!
//! Orchestrates the capture and transcription ports through one
//! recording session: start acquires the microphone and opens the
//! streaming connection, stop tears both down, and transcript events
//! fold into the session's accumulated text.

use crate::application::ports::{
    AudioCapture, CaptureError, LinkError, LinkHandlers, TranscriptionLink,
};
use crate::domain::session::{InvalidStateTransition, RecordingSession, SessionState};
use crate::domain::transcription::TranscriptEvent;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Event emitted to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The accumulated transcript changed; carries the full text
    TranscriptChanged(String),
    /// Recording started (true) or ended (false)
    RecordingStateChanged(bool),
    /// The session failed after starting
    Error(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Capture(#[from] CaptureError),

    #[error("{0}")]
    Link(#[from] LinkError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Deepgram API key not found. Set DEEPGRAM_API_KEY or run 'streamscribe config set api_key <key>'.")]
    MissingApiKey,
}

/// Coordinates one push-to-talk session over the capture and link ports.
///
/// Failures before `start` returns surface through its `Result`; failures
/// after the session is running (dropped connection, provider error)
/// surface as [`SessionEvent::Error`] on the event channel.
pub struct SessionController<C, L> {
    capture: Arc<C>,
    link: Arc<L>,
    session: Arc<Mutex<RecordingSession>>,
    events: UnboundedSender<SessionEvent>,
}

impl<C, L> SessionController<C, L>
where
    C: AudioCapture + 'static,
    L: TranscriptionLink + 'static,
{
    pub fn new(capture: Arc<C>, link: Arc<L>) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            capture,
            link,
            session: Arc::new(Mutex::new(RecordingSession::new())),
            events,
        };
        (controller, receiver)
    }

    /// Start a session. Returns Ok(false) without side effects when one
    /// is already in progress.
    pub async fn start(&self) -> Result<bool, SessionError> {
        if !self.session.lock().unwrap().begin_start() {
            return Ok(false);
        }

        if let Err(e) = self.capture.initialize().await {
            self.abort_start().await;
            return Err(e.into());
        }

        if let Err(e) = self.session.lock().unwrap().connecting() {
            self.abort_start().await;
            return Err(e.into());
        }

        if let Err(e) = self.link.connect(self.handlers()).await {
            self.abort_start().await;
            return Err(e.into());
        }

        if let Err(e) = self.capture.start_capture(self.frame_relay()) {
            self.abort_start().await;
            return Err(e.into());
        }

        if let Err(e) = self.session.lock().unwrap().activate() {
            self.abort_start().await;
            return Err(e.into());
        }

        let _ = self.events.send(SessionEvent::RecordingStateChanged(true));
        Ok(true)
    }

    /// Stop the session deliberately. Idempotent; stopping while idle
    /// does nothing and emits nothing.
    pub async fn stop(&self) {
        if !self.session.lock().unwrap().begin_stop() {
            return;
        }
        self.capture.stop_capture();
        self.link.disconnect().await;
        self.session.lock().unwrap().settle();
        let _ = self.events.send(SessionEvent::RecordingStateChanged(false));
    }

    pub fn state(&self) -> SessionState {
        self.session.lock().unwrap().state()
    }

    pub fn is_recording(&self) -> bool {
        self.session.lock().unwrap().is_recording()
    }

    /// The accumulated transcript text
    pub fn transcript(&self) -> String {
        self.session.lock().unwrap().transcript().text().to_string()
    }

    pub fn word_count(&self) -> usize {
        self.session.lock().unwrap().transcript().word_count()
    }

    /// Discard the accumulated transcript
    pub fn clear_transcript(&self) {
        self.session.lock().unwrap().transcript_mut().clear();
        let _ = self
            .events
            .send(SessionEvent::TranscriptChanged(String::new()));
    }

    /// Tear down after a failed start attempt
    async fn abort_start(&self) {
        self.session.lock().unwrap().fail();
        self.capture.stop_capture();
        self.link.disconnect().await;
        self.session.lock().unwrap().settle();
        let _ = self.events.send(SessionEvent::RecordingStateChanged(false));
    }

    /// Handlers the link drives for the lifetime of the connection
    fn handlers(&self) -> LinkHandlers {
        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let on_transcript = Arc::new(move |text: &str, is_final: bool| {
            let event = TranscriptEvent::new(text, is_final);
            let mut guard = session.lock().unwrap();
            if guard.transcript_mut().fold(&event) {
                let full = guard.transcript().text().to_string();
                drop(guard);
                let _ = events.send(SessionEvent::TranscriptChanged(full));
            }
        });

        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let capture = Arc::clone(&self.capture);
        let link = Arc::clone(&self.link);
        let on_error = Arc::new(move |message: String| {
            {
                let mut guard = session.lock().unwrap();
                // a late error from a connection we already closed
                if guard.state() == SessionState::Idle {
                    return;
                }
                guard.fail();
            }
            capture.stop_capture();
            let link = Arc::clone(&link);
            tokio::spawn(async move { link.disconnect().await });
            session.lock().unwrap().settle();
            let _ = events.send(SessionEvent::Error(message));
            let _ = events.send(SessionEvent::RecordingStateChanged(false));
        });

        LinkHandlers {
            on_transcript,
            on_error,
        }
    }

    /// Callback relaying captured frames to the link
    fn frame_relay(&self) -> crate::application::ports::FrameCallback {
        let link = Arc::clone(&self.link);
        Arc::new(move |frame| {
            if !link.is_connected() {
                return;
            }
            if let Err(e) = link.send_audio(&frame) {
                log::debug!("dropping frame: {e}");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::FrameCallback;
    use crate::domain::audio::AudioFrame;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct MockCapture {
        initialized: AtomicBool,
        active: AtomicBool,
        fail_init: Option<CaptureError>,
    }

    impl MockCapture {
        fn failing(error: CaptureError) -> Self {
            Self {
                fail_init: Some(error),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl AudioCapture for MockCapture {
        async fn initialize(&self) -> Result<(), CaptureError> {
            if let Some(err) = &self.fail_init {
                return Err(match err {
                    CaptureError::PermissionDenied => CaptureError::PermissionDenied,
                    CaptureError::DeviceNotFound => CaptureError::DeviceNotFound,
                    CaptureError::InitFailed(m) => CaptureError::InitFailed(m.clone()),
                    CaptureError::NotInitialized => CaptureError::NotInitialized,
                });
            }
            self.initialized.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn start_capture(&self, _on_frame: FrameCallback) -> Result<(), CaptureError> {
            if !self.initialized.load(Ordering::SeqCst) {
                return Err(CaptureError::NotInitialized);
            }
            self.active.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop_capture(&self) {
            self.active.store(false, Ordering::SeqCst);
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct MockLink {
        connected: AtomicBool,
        handlers: Mutex<Option<LinkHandlers>>,
    }

    impl MockLink {
        fn emit_transcript(&self, text: &str, is_final: bool) {
            let guard = self.handlers.lock().unwrap();
            let handlers = guard.as_ref().expect("not connected");
            (handlers.on_transcript)(text, is_final);
        }

        fn emit_error(&self, message: &str) {
            let guard = self.handlers.lock().unwrap();
            let handlers = guard.as_ref().expect("not connected");
            self.connected.store(false, Ordering::SeqCst);
            (handlers.on_error)(message.to_string());
        }
    }

    #[async_trait]
    impl TranscriptionLink for MockLink {
        async fn connect(&self, handlers: LinkHandlers) -> Result<(), LinkError> {
            *self.handlers.lock().unwrap() = Some(handlers);
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn send_audio(&self, _frame: &AudioFrame) -> Result<(), LinkError> {
            if !self.connected.load(Ordering::SeqCst) {
                return Err(LinkError::NotConnected);
            }
            Ok(())
        }

        async fn disconnect(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }
    }

    fn controller(
        capture: MockCapture,
        link: MockLink,
    ) -> (
        SessionController<MockCapture, MockLink>,
        UnboundedReceiver<SessionEvent>,
        Arc<MockLink>,
    ) {
        let link = Arc::new(link);
        let (controller, events) = SessionController::new(Arc::new(capture), Arc::clone(&link));
        (controller, events, link)
    }

    #[tokio::test]
    async fn start_and_stop_lifecycle() {
        let (controller, mut events, _link) =
            controller(MockCapture::default(), MockLink::default());

        assert!(controller.start().await.unwrap());
        assert!(controller.is_recording());
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::RecordingStateChanged(true))
        );

        controller.stop().await;
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::RecordingStateChanged(false))
        );
    }

    #[tokio::test]
    async fn second_start_is_a_no_op() {
        let (controller, _events, _link) =
            controller(MockCapture::default(), MockLink::default());
        assert!(controller.start().await.unwrap());
        assert!(!controller.start().await.unwrap());
    }

    #[tokio::test]
    async fn stop_while_idle_emits_nothing() {
        let (controller, mut events, _link) =
            controller(MockCapture::default(), MockLink::default());
        controller.stop().await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn init_failure_returns_error_and_settles() {
        let (controller, _events, _link) = controller(
            MockCapture::failing(CaptureError::PermissionDenied),
            MockLink::default(),
        );
        let err = controller.start().await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn final_transcripts_accumulate_and_emit() {
        let (controller, mut events, link) =
            controller(MockCapture::default(), MockLink::default());
        controller.start().await.unwrap();
        events.recv().await; // RecordingStateChanged(true)

        link.emit_transcript("hello", true);
        link.emit_transcript("hello", true); // duplicate final
        link.emit_transcript("wor", false); // interim
        link.emit_transcript("world", true);

        assert_eq!(
            events.recv().await,
            Some(SessionEvent::TranscriptChanged("hello ".to_string()))
        );
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::TranscriptChanged("hello world ".to_string()))
        );
        assert_eq!(controller.word_count(), 2);
    }

    #[tokio::test]
    async fn link_error_tears_down_and_reports_once() {
        let (controller, mut events, link) =
            controller(MockCapture::default(), MockLink::default());
        controller.start().await.unwrap();
        events.recv().await;

        link.emit_transcript("hello", true);
        events.recv().await;

        link.emit_error("Connection closed unexpectedly. Please try again.");
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::Error(
                "Connection closed unexpectedly. Please try again.".to_string()
            ))
        );
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::RecordingStateChanged(false))
        );
        assert_eq!(controller.state(), SessionState::Idle);
        // transcript is preserved through the failure
        assert_eq!(controller.transcript(), "hello ");
    }

    #[tokio::test]
    async fn clear_transcript_emits_empty_text() {
        let (controller, mut events, link) =
            controller(MockCapture::default(), MockLink::default());
        controller.start().await.unwrap();
        events.recv().await;
        link.emit_transcript("hello", true);
        events.recv().await;

        controller.clear_transcript();
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::TranscriptChanged(String::new()))
        );
        assert_eq!(controller.transcript(), "");
    }

    #[tokio::test]
    async fn transcript_survives_across_sessions() {
        let (controller, _events, link) =
            controller(MockCapture::default(), MockLink::default());
        controller.start().await.unwrap();
        link.emit_transcript("hello", true);
        controller.stop().await;

        controller.start().await.unwrap();
        // dedup memory was reset, so the same fragment is accepted
        link.emit_transcript("hello", true);
        assert_eq!(controller.transcript(), "hello hello ");
    }
}
