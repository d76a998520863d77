//! Audio I/O: microphone capture through endpointing to WAV,
//! and playback of synthesized speech.
//!
//! # Capture path
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → downmix_to_mono
//!           → resample_to_16k → UtteranceDetector → encode_wav
//! ```

pub mod capture;
pub mod playback;
pub mod resample;
pub mod vad;
pub mod wav;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use playback::{play_blocking, PlaybackError};
pub use resample::{downmix_to_mono, resample_to_16k, TARGET_RATE};
pub use vad::{Endpoint, UtteranceDetector};
pub use wav::encode_wav;
