//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] wraps the cpal host/device/stream lifecycle.
//! [`AudioCapture::record_utterance`] blocks until one utterance has been
//! captured (or the endpointer gives up) and returns 16 kHz mono samples.

use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use thiserror::Error;

use crate::audio::resample::{downmix_to_mono, resample_to_16k};
use crate::audio::vad::{Endpoint, UtteranceDetector};

/// Longest gap between two cpal callbacks before the stream is considered dead.
const CHUNK_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz (e.g. 44100, 48000, 16000).
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive; dropping it stops capture.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported input sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio stream stopped delivering samples")]
    StreamStalled,
}

/// Convert one callback buffer to `f32` in `[-1.0, 1.0]`.
fn to_f32<T>(data: &[T]) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    data.iter().map(|&s| f32::from_sample(s)).collect()
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// Default-input-device capture session.
///
/// `cpal::Stream` is not `Send` on every platform, so construct and use an
/// `AudioCapture` on the same (blocking) thread.
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    /// Open the system default input device with its preferred configuration.
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_format,
            sample_rate,
            channels,
        })
    }

    /// Start the stream and forward every callback buffer to `tx`.
    ///
    /// The stream is opened in the device's native sample format; buffers
    /// are converted to `f32` before they are sent.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(tx)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(tx)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(tx)?,
            other => return Err(CaptureError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// Send errors (receiver dropped) are ignored so the audio thread never
    /// panics.
    fn build_stream<T>(&self, tx: mpsc::Sender<AudioChunk>) -> Result<cpal::Stream, CaptureError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: to_f32(data),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;
        Ok(stream)
    }

    /// Capture a single utterance.
    ///
    /// Blocks until `detector` reports an endpoint.  Returns `Ok(None)` when
    /// no speech started before the detector's initial-silence limit.
    pub fn record_utterance(
        &self,
        mut detector: UtteranceDetector,
    ) -> Result<Option<Vec<f32>>, CaptureError> {
        let (tx, rx) = mpsc::channel::<AudioChunk>();
        let _handle = self.start(tx)?;

        log::debug!(
            "capture: recording from default input ({} Hz, {} ch, {:?})",
            self.sample_rate,
            self.channels,
            self.sample_format
        );

        loop {
            let chunk = rx
                .recv_timeout(CHUNK_TIMEOUT)
                .map_err(|_| CaptureError::StreamStalled)?;

            let mono = downmix_to_mono(&chunk.samples, chunk.channels);
            let pcm = resample_to_16k(&mono, chunk.sample_rate);

            match detector.push(&pcm) {
                Endpoint::Pending => continue,
                Endpoint::Complete => return Ok(Some(detector.finish())),
                Endpoint::NoSpeech => return Ok(None),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
