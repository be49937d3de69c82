//! Recording session entity and transcript accumulation

mod state;
mod transcript;

pub use state::{InvalidStateTransition, RecordingSession, SessionState};
pub use transcript::TranscriptBuffer;
