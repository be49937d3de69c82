//! Audio frame value object

/// Sample rate every frame is captured and transmitted at
pub const SAMPLE_RATE: u32 = 16_000;

/// Number of samples in one capture block
pub const FRAME_SAMPLES: usize = 4096;

/// Convert one normalized f32 sample to a signed 16-bit PCM sample.
/// Values are clamped to [-1, 1]; negatives scale by 32768 so that
/// -1.0 maps to i16::MIN, non-negatives by 32767 so 1.0 maps to i16::MAX.
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Value object representing one block of mono 16 kHz audio samples
/// in the normalized range [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    samples: Vec<f32>,
}

impl AudioFrame {
    /// Create a frame from raw samples
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Get the raw samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples in the frame
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the frame contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode the frame as signed 16-bit little-endian PCM bytes
    pub fn to_pcm_s16le(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for &sample in &self.samples {
            out.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
        }
        out
    }
}
