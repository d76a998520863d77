//! Text-to-speech: render a response with the configured neural voice and
//! play it on the default output device.

pub mod ssml;
pub mod synthesizer;

pub use ssml::build_ssml;
pub use synthesizer::{
    narration, report, synthesis_url, SpeechError, SpeechServiceSynthesizer, SynthesisOutcome, Synthesizer,
};

#[cfg(test)]
pub use synthesizer::RecordingSynthesizer;
