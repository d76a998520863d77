//! Speech-to-text: capture one utterance and recognise it remotely.
//!
//! ```text
//! Transcriber::recognize_once()
//!   └─▶ AudioCapture::record_utterance   (spawn_blocking, cpal + VAD)
//!         └─▶ encode_wav → POST short-audio recognition
//!               └─▶ Recognized(text) | NoMatch | Canceled { reason, details }
//! ```

pub mod recognition;
pub mod transcriber;

pub use recognition::{CancellationReason, Recognition};
pub use transcriber::{recognition_url, SpeechServiceTranscriber, Transcriber};

#[cfg(test)]
pub use transcriber::ScriptedTranscriber;
