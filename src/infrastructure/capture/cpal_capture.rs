//! Cross-platform microphone capture using cpal.
//!
//! Streams mono 16 kHz normalized f32 frames of 4096 samples. Devices
//! that cannot run at 16 kHz are resampled; multi-channel input is mixed
//! down by averaging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};

use crate::application::ports::{AudioCapture, CaptureError, FrameCallback};
use crate::domain::audio::{AudioFrame, FRAME_SAMPLES, SAMPLE_RATE};

/// Microphone capture adapter using cpal.
///
/// The cpal stream is not Send, so it lives on a dedicated thread that
/// polls the active flag. `initialize` probes the device up front so
/// missing-device and permission failures surface before a session
/// starts rather than from inside the capture thread.
pub struct CpalCapture {
    initialized: AtomicBool,
    active: Arc<AtomicBool>,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    fn default_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::DeviceNotFound)
    }

    /// Pick an input configuration: i16 or f32 only, prefer configs that
    /// include 16 kHz, prefer fewer channels
    fn select_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported = device
            .supported_input_configs()
            .map_err(|e| Self::classify_device_error(&e.to_string()))?;

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for config in supported {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= SAMPLE_RATE
                && config.max_sample_rate().0 >= SAMPLE_RATE;

            let is_better = match &best {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best = Some(config);
            }
        }

        let range = best.ok_or_else(|| {
            CaptureError::InitFailed("no usable input configuration".to_string())
        })?;

        let sample_rate =
            if range.min_sample_rate().0 <= SAMPLE_RATE && range.max_sample_rate().0 >= SAMPLE_RATE
            {
                SampleRate(SAMPLE_RATE)
            } else {
                range.min_sample_rate()
            };

        let sample_format = range.sample_format();
        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, sample_format))
    }

    /// Map an OS-level device error description to a port error
    fn classify_device_error(description: &str) -> CaptureError {
        let lower = description.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed")
        {
            CaptureError::PermissionDenied
        } else {
            CaptureError::InitFailed(description.to_string())
        }
    }

    fn map_build_error(error: cpal::BuildStreamError) -> CaptureError {
        match error {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceNotFound,
            other => Self::classify_device_error(&other.to_string()),
        }
    }

    /// Runs on the capture thread for the lifetime of one session
    fn run_stream(active: Arc<AtomicBool>, on_frame: FrameCallback) {
        let device = match Self::default_input_device() {
            Ok(d) => d,
            Err(e) => {
                log::error!("capture thread lost input device: {e}");
                active.store(false, Ordering::SeqCst);
                return;
            }
        };
        let (config, sample_format) = match Self::select_input_config(&device) {
            Ok(c) => c,
            Err(e) => {
                log::error!("capture thread could not configure device: {e}");
                active.store(false, Ordering::SeqCst);
                return;
            }
        };

        let channels = config.channels;
        let device_rate = config.sample_rate.0;
        let assembler = Arc::new(StdMutex::new(FrameAssembler::new(device_rate, channels)));

        let stream_result = match sample_format {
            SampleFormat::F32 => {
                let assembler = Arc::clone(&assembler);
                let on_frame = Arc::clone(&on_frame);
                let running = Arc::clone(&active);
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if running.load(Ordering::SeqCst) {
                            if let Ok(mut assembler) = assembler.lock() {
                                assembler.push(data, &on_frame);
                            }
                        }
                    },
                    |err| log::error!("audio stream error: {err}"),
                    None,
                )
            }
            SampleFormat::I16 => {
                let assembler = Arc::clone(&assembler);
                let on_frame = Arc::clone(&on_frame);
                let running = Arc::clone(&active);
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if running.load(Ordering::SeqCst) {
                            let normalized: Vec<f32> =
                                data.iter().map(|&s| s as f32 / 32768.0).collect();
                            if let Ok(mut assembler) = assembler.lock() {
                                assembler.push(&normalized, &on_frame);
                            }
                        }
                    },
                    |err| log::error!("audio stream error: {err}"),
                    None,
                )
            }
            _ => {
                log::error!("unsupported sample format: {sample_format:?}");
                active.store(false, Ordering::SeqCst);
                return;
            }
        };

        let stream = match stream_result {
            Ok(s) => s,
            Err(e) => {
                log::error!("failed to build input stream: {}", Self::map_build_error(e));
                active.store(false, Ordering::SeqCst);
                return;
            }
        };

        if let Err(e) = stream.play() {
            log::error!("failed to start input stream: {e}");
            active.store(false, Ordering::SeqCst);
            return;
        }

        while active.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        drop(stream);
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioCapture for CpalCapture {
    async fn initialize(&self) -> Result<(), CaptureError> {
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }

        // probe on a blocking thread; some hosts touch the audio backend
        // during enumeration
        tokio::task::spawn_blocking(|| {
            let device = Self::default_input_device()?;
            Self::select_input_config(&device)?;
            Ok::<(), CaptureError>(())
        })
        .await
        .map_err(|e| CaptureError::InitFailed(format!("probe task failed: {e}")))??;

        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn start_capture(&self, on_frame: FrameCallback) -> Result<(), CaptureError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(CaptureError::NotInitialized);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let active = Arc::clone(&self.active);
        std::thread::spawn(move || Self::run_stream(active, on_frame));
        Ok(())
    }

    fn stop_capture(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.initialized.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Turns interleaved device samples into mono 16 kHz frames of
/// [`FRAME_SAMPLES`] samples, resampling when the device rate differs.
struct FrameAssembler {
    channels: u16,
    resampler: Option<FftFixedIn<f32>>,
    pending_in: Vec<f32>,
    pending_out: Vec<f32>,
}

impl FrameAssembler {
    fn new(device_rate: u32, channels: u16) -> Self {
        let resampler = if device_rate == SAMPLE_RATE {
            None
        } else {
            FftFixedIn::<f32>::new(device_rate as usize, SAMPLE_RATE as usize, 1024, 2, 1)
                .map_err(|e| log::error!("resampler init failed: {e}"))
                .ok()
        };
        Self {
            channels,
            resampler,
            pending_in: Vec::new(),
            pending_out: Vec::new(),
        }
    }

    /// Feed interleaved samples; emits a frame for every full block
    fn push(&mut self, interleaved: &[f32], emit: &FrameCallback) {
        if self.channels <= 1 {
            self.pending_in.extend_from_slice(interleaved);
        } else {
            let channels = self.channels as usize;
            self.pending_in.extend(
                interleaved
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        match &mut self.resampler {
            None => {
                self.pending_out.append(&mut self.pending_in);
            }
            Some(resampler) => loop {
                let needed = resampler.input_frames_next();
                if self.pending_in.len() < needed {
                    break;
                }
                let chunk: Vec<f32> = self.pending_in.drain(..needed).collect();
                match resampler.process(&[chunk], None) {
                    Ok(mut output) => self.pending_out.append(&mut output[0]),
                    Err(e) => {
                        log::error!("resampling failed: {e}");
                        break;
                    }
                }
            },
        }

        while self.pending_out.len() >= FRAME_SAMPLES {
            let samples: Vec<f32> = self.pending_out.drain(..FRAME_SAMPLES).collect();
            emit(AudioFrame::new(samples));
        }
    }
}
