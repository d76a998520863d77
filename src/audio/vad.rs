//! Energy-based utterance endpointing.
//!
//! [`UtteranceDetector`] consumes 16 kHz mono audio in arbitrary-sized pieces,
//! classifies it in 30 ms frames (480 samples) by RMS energy, and decides when
//! one utterance is over:
//!
//! * speech was heard and has been followed by `trailing_silence_ms` of
//!   silence, or
//! * `max_utterance_secs` of audio have been consumed.
//!
//! If no frame crosses the threshold within `initial_silence_secs` the
//! detector reports [`Endpoint::NoSpeech`].

use crate::config::CaptureConfig;

/// 30 ms at 16 kHz.
const FRAME_SIZE: usize = 480;
const FRAME_MS: f32 = 30.0;

/// Detector verdict after each [`UtteranceDetector::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Keep feeding audio.
    Pending,
    /// Speech was captured and the utterance has ended.
    Complete,
    /// Nothing but silence before the initial-silence limit.
    NoSpeech,
}

/// Streaming end-of-utterance detector.
///
/// ```rust
/// use alessandro::audio::{Endpoint, UtteranceDetector};
///
/// // 0.01 RMS threshold, give up after 90 ms of silence, 60 ms trailing gap.
/// let mut det = UtteranceDetector::new(0.01, 90.0 / 1000.0, 60, 10.0);
/// assert_eq!(det.push(&vec![0.5_f32; 480]), Endpoint::Pending);
/// assert_eq!(det.push(&vec![0.0_f32; 960]), Endpoint::Complete);
/// assert_eq!(det.finish().len(), 480);
/// ```
#[derive(Debug)]
pub struct UtteranceDetector {
    rms_threshold: f32,
    initial_silence_frames: usize,
    trailing_silence_frames: usize,
    max_frames: usize,

    /// Samples not yet forming a full frame.
    partial: Vec<f32>,
    /// Every complete frame consumed so far.
    audio: Vec<f32>,
    frames: usize,
    first_voice_frame: Option<usize>,
    last_voice_frame: usize,
    silence_run: usize,
    state: Endpoint,
}

/// Nearest whole number of frames, never zero.
fn frames_for_ms(ms: f32) -> usize {
    ((ms / FRAME_MS).round() as usize).max(1)
}

impl UtteranceDetector {
    pub fn new(
        rms_threshold: f32,
        initial_silence_secs: f32,
        trailing_silence_ms: u64,
        max_utterance_secs: f32,
    ) -> Self {
        Self {
            rms_threshold,
            initial_silence_frames: frames_for_ms(initial_silence_secs * 1000.0),
            trailing_silence_frames: frames_for_ms(trailing_silence_ms as f32),
            max_frames: frames_for_ms(max_utterance_secs * 1000.0),
            partial: Vec::with_capacity(FRAME_SIZE),
            audio: Vec::new(),
            frames: 0,
            first_voice_frame: None,
            last_voice_frame: 0,
            silence_run: 0,
            state: Endpoint::Pending,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            config.vad_threshold,
            config.initial_silence_secs,
            config.trailing_silence_ms,
            config.max_utterance_secs,
        )
    }

    /// Feed 16 kHz mono samples.  Once a terminal verdict has been reached
    /// further input is ignored and the same verdict is returned.
    pub fn push(&mut self, samples: &[f32]) -> Endpoint {
        for &s in samples {
            if self.state != Endpoint::Pending {
                break;
            }
            self.partial.push(s);
            if self.partial.len() == FRAME_SIZE {
                let frame = std::mem::replace(&mut self.partial, Vec::with_capacity(FRAME_SIZE));
                self.consume_frame(&frame);
                self.audio.extend(frame);
            }
        }
        self.state
    }

    fn consume_frame(&mut self, frame: &[f32]) {
        let index = self.frames;
        self.frames += 1;

        if is_voice(frame, self.rms_threshold) {
            self.first_voice_frame.get_or_insert(index);
            self.last_voice_frame = index;
            self.silence_run = 0;
        } else if self.first_voice_frame.is_some() {
            self.silence_run += 1;
        }

        let heard_speech = self.first_voice_frame.is_some();
        self.state = if heard_speech && self.silence_run >= self.trailing_silence_frames {
            Endpoint::Complete
        } else if !heard_speech && self.frames >= self.initial_silence_frames {
            Endpoint::NoSpeech
        } else if self.frames >= self.max_frames {
            if heard_speech {
                Endpoint::Complete
            } else {
                Endpoint::NoSpeech
            }
        } else {
            Endpoint::Pending
        };
    }

    /// Consume the detector and return the captured speech, trimmed to the
    /// first and last voice frames.  Empty when no speech was heard.
    pub fn finish(self) -> Vec<f32> {
        let Some(first) = self.first_voice_frame else {
            return Vec::new();
        };
        let start = first * FRAME_SIZE;
        let end = ((self.last_voice_frame + 1) * FRAME_SIZE).min(self.audio.len());
        self.audio[start..end].to_vec()
    }
}

fn is_voice(frame: &[f32], threshold: f32) -> bool {
    if frame.is_empty() {
        return false;
    }
    let mean_sq = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
    mean_sq.sqrt() > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence(frames: usize) -> Vec<f32> {
        vec![0.0; frames * FRAME_SIZE]
    }

    fn voice(frames: usize) -> Vec<f32> {
        vec![0.5; frames * FRAME_SIZE]
    }

    /// 300 ms initial silence, 90 ms trailing, 1.5 s cap.
    fn detector() -> UtteranceDetector {
        UtteranceDetector::new(0.01, 0.3, 90, 1.5)
    }

    #[test]
    fn completes_after_trailing_silence() {
        let mut det = detector();
        assert_eq!(det.push(&silence(2)), Endpoint::Pending);
        assert_eq!(det.push(&voice(3)), Endpoint::Pending);
        assert_eq!(det.push(&silence(2)), Endpoint::Pending);
        assert_eq!(det.push(&silence(1)), Endpoint::Complete);
        assert_eq!(det.finish().len(), 3 * FRAME_SIZE);
    }

    #[test]
    fn reports_no_speech_after_initial_silence() {
        let mut det = detector();
        assert_eq!(det.push(&silence(9)), Endpoint::Pending);
        assert_eq!(det.push(&silence(1)), Endpoint::NoSpeech);
        assert!(det.finish().is_empty());
    }

    #[test]
    fn short_pause_inside_speech_does_not_end_utterance() {
        let mut det = detector();
        det.push(&voice(2));
        det.push(&silence(2));
        assert_eq!(det.push(&voice(2)), Endpoint::Pending);
        assert_eq!(det.push(&silence(3)), Endpoint::Complete);
        // voice, pause, voice: 6 frames between first and last voice frame.
        assert_eq!(det.finish().len(), 6 * FRAME_SIZE);
    }

    #[test]
    fn max_length_closes_continuous_speech() {
        let mut det = detector();
        assert_eq!(det.push(&voice(49)), Endpoint::Pending);
        assert_eq!(det.push(&voice(1)), Endpoint::Complete);
    }

    #[test]
    fn accepts_input_split_mid_frame() {
        let mut det = detector();
        let audio = [voice(1), silence(3)].concat();
        let (a, b) = audio.split_at(700);
        assert_eq!(det.push(a), Endpoint::Pending);
        assert_eq!(det.push(b), Endpoint::Complete);
    }

    #[test]
    fn terminal_state_is_sticky() {
        let mut det = detector();
        det.push(&voice(1));
        det.push(&silence(3));
        assert_eq!(det.push(&voice(5)), Endpoint::Complete);
        assert_eq!(det.finish().len(), FRAME_SIZE);
    }

    #[test]
    fn from_config_uses_capture_settings() {
        let config = CaptureConfig {
            vad_threshold: 0.2,
            ..CaptureConfig::default()
        };
        let mut det = UtteranceDetector::from_config(&config);
        // 0.1 RMS is below the configured threshold.
        det.push(&vec![0.1; FRAME_SIZE * 4]);
        assert!(det.finish().is_empty());
    }
}
