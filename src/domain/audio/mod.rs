//! Audio value objects

mod frame;

pub use frame::{sample_to_i16, AudioFrame, FRAME_SAMPLES, SAMPLE_RATE};
