//! Recording session state machine

use super::transcript::TranscriptBuffer;
use thiserror::Error;

/// Lifecycle state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session in progress
    #[default]
    Idle,
    /// Acquiring the microphone
    Initializing,
    /// Opening the transcription connection
    Connecting,
    /// Audio is streaming and transcripts are arriving
    Active,
    /// Deliberate teardown in progress
    Stopping,
    /// A failure occurred and teardown is in progress
    Errored,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Initializing => "initializing",
            SessionState::Connecting => "connecting",
            SessionState::Active => "active",
            SessionState::Stopping => "stopping",
            SessionState::Errored => "errored",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when an action is attempted in a state that does not allow it
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot {action} while session is {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

impl InvalidStateTransition {
    pub fn new(current_state: SessionState, action: impl Into<String>) -> Self {
        Self {
            current_state,
            action: action.into(),
        }
    }
}

/// Entity tracking one push-to-talk session and its transcript.
///
/// The transcript survives the session: stopping a session keeps the
/// accumulated text so the next session appends to it. Only an explicit
/// clear discards it.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: SessionState,
    transcript: TranscriptBuffer,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn transcript(&self) -> &TranscriptBuffer {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut TranscriptBuffer {
        &mut self.transcript
    }

    /// Try to begin a new session. Returns false if one is already in
    /// progress, which makes a second start request a no-op rather than
    /// an error. Resets duplicate suppression for the new session.
    pub fn begin_start(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.state = SessionState::Initializing;
        self.transcript.reset_dedup();
        true
    }

    /// Microphone acquired, connection attempt starting
    pub fn connecting(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Initializing {
            return Err(InvalidStateTransition::new(self.state, "connect"));
        }
        self.state = SessionState::Connecting;
        Ok(())
    }

    /// Connection established, audio is flowing
    pub fn activate(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Connecting {
            return Err(InvalidStateTransition::new(self.state, "activate"));
        }
        self.state = SessionState::Active;
        Ok(())
    }

    /// Try to begin a deliberate stop. Returns false when there is
    /// nothing to stop, making stop idempotent.
    pub fn begin_stop(&mut self) -> bool {
        match self.state {
            SessionState::Initializing | SessionState::Connecting | SessionState::Active => {
                self.state = SessionState::Stopping;
                true
            }
            _ => false,
        }
    }

    /// Mark the session failed. A failure while already idle is stale
    /// and ignored.
    pub fn fail(&mut self) {
        if self.state != SessionState::Idle {
            self.state = SessionState::Errored;
        }
    }

    /// Teardown finished, return to idle
    pub fn settle(&mut self) {
        if matches!(self.state, SessionState::Stopping | SessionState::Errored) {
            self.state = SessionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let session = RecordingSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.is_recording());
    }

    #[test]
    fn full_lifecycle() {
        let mut session = RecordingSession::new();
        assert!(session.begin_start());
        assert_eq!(session.state(), SessionState::Initializing);
        session.connecting().unwrap();
        session.activate().unwrap();
        assert!(session.is_recording());
        assert!(session.begin_stop());
        assert_eq!(session.state(), SessionState::Stopping);
        session.settle();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn start_while_in_progress_is_refused() {
        let mut session = RecordingSession::new();
        assert!(session.begin_start());
        assert!(!session.begin_start());
        session.connecting().unwrap();
        assert!(!session.begin_start());
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let mut session = RecordingSession::new();
        assert!(!session.begin_stop());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn stop_during_startup_is_allowed() {
        let mut session = RecordingSession::new();
        session.begin_start();
        assert!(session.begin_stop());
        assert_eq!(session.state(), SessionState::Stopping);
    }

    #[test]
    fn activate_from_idle_fails() {
        let mut session = RecordingSession::new();
        let err = session.activate().unwrap_err();
        assert_eq!(err.current_state, SessionState::Idle);
        assert_eq!(err.to_string(), "Cannot activate while session is idle");
    }

    #[test]
    fn failure_then_settle_returns_to_idle() {
        let mut session = RecordingSession::new();
        session.begin_start();
        session.connecting().unwrap();
        session.fail();
        assert_eq!(session.state(), SessionState::Errored);
        session.settle();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn stale_failure_while_idle_is_ignored() {
        let mut session = RecordingSession::new();
        session.fail();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn transcript_survives_stop() {
        let mut session = RecordingSession::new();
        session.begin_start();
        session.connecting().unwrap();
        session.activate().unwrap();
        session.transcript_mut().push_final("hello");
        session.begin_stop();
        session.settle();
        assert_eq!(session.transcript().text(), "hello ");
    }

    #[test]
    fn new_session_resets_duplicate_suppression() {
        let mut session = RecordingSession::new();
        session.begin_start();
        session.transcript_mut().push_final("hello");
        session.begin_stop();
        session.settle();
        session.begin_start();
        assert!(session.transcript_mut().push_final("hello"));
        assert_eq!(session.transcript().text(), "hello hello ");
    }
}
