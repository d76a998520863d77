//! [`Synthesizer`] trait and the speech-service implementation.
//!
//! [`SpeechServiceSynthesizer`] posts SSML to the synthesis REST endpoint,
//! receives a RIFF/WAV clip and plays it on the default output device.
//! Every failure is reported as [`SynthesisOutcome::Canceled`] with
//! [`CancellationReason::Error`]; `speak` itself never errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::{play_blocking, PlaybackError};
use crate::config::AppConfig;
use crate::http::{client_with_timeout, ensure_success, HttpError, SUBSCRIPTION_KEY_HEADER};
use crate::stt::CancellationReason;
use crate::tts::ssml::build_ssml;

pub const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

// ---------------------------------------------------------------------------
// SynthesisOutcome / SpeechError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    Completed,
    Canceled {
        reason: CancellationReason,
        error_details: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("playback task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        SpeechError::Http(e.into())
    }
}

impl From<SpeechError> for SynthesisOutcome {
    fn from(e: SpeechError) -> Self {
        let details = match e {
            SpeechError::Http(HttpError::Status { status, body }) => format!("{status}: {body}"),
            other => other.to_string(),
        };
        SynthesisOutcome::Canceled {
            reason: CancellationReason::Error,
            error_details: Some(details),
        }
    }
}

/// Status lines describing `outcome`, in the order they are logged.
pub fn narration(outcome: &SynthesisOutcome) -> Vec<(log::Level, String)> {
    match outcome {
        SynthesisOutcome::Completed => {
            vec![(log::Level::Info, "Speech synthesized successfully.".to_string())]
        }
        SynthesisOutcome::Canceled {
            reason,
            error_details,
        } => {
            let mut lines = vec![(
                log::Level::Warn,
                format!("Speech synthesis canceled: {reason}"),
            )];
            if *reason == CancellationReason::Error {
                if let Some(details) = error_details {
                    lines.push((log::Level::Warn, format!("Error details: {details}")));
                }
                lines.push((
                    log::Level::Warn,
                    "Did you set the speech resource key and region values?".to_string(),
                ));
            }
            lines
        }
    }
}

/// Log the outcome the way the console narration expects.
pub fn report(outcome: &SynthesisOutcome) {
    for (level, line) in narration(outcome) {
        log::log!(level, "{line}");
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Speak `text` aloud, returning once playback has finished.
    async fn speak(&self, text: &str) -> SynthesisOutcome;
}

// ---------------------------------------------------------------------------
// SpeechServiceSynthesizer
// ---------------------------------------------------------------------------

pub struct SpeechServiceSynthesizer {
    client: reqwest::Client,
    url: String,
    key: String,
    voice: String,
}

impl SpeechServiceSynthesizer {
    pub fn from_config(config: &AppConfig) -> Self {
        let region = config.speech.region.as_deref().unwrap_or_default();
        Self {
            client: client_with_timeout(config.speech.timeout_secs),
            url: synthesis_url(region),
            key: config.speech.key.clone().unwrap_or_default(),
            voice: config.speech.voice_name.clone(),
        }
    }

    /// Fetch the rendered clip for `text`.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .post(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header(reqwest::header::USER_AGENT, env!("CARGO_PKG_NAME"))
            .body(build_ssml(&self.voice, text))
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn speak_inner(&self, text: &str) -> Result<(), SpeechError> {
        let audio = self.synthesize(text).await?;
        log::debug!("tts: received {} bytes", audio.len());
        tokio::task::spawn_blocking(move || play_blocking(audio))
            .await
            .map_err(|e| SpeechError::Task(e.to_string()))??;
        Ok(())
    }
}

/// Synthesis endpoint for `region`.
pub fn synthesis_url(region: &str) -> String {
    format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1")
}

#[async_trait]
impl Synthesizer for SpeechServiceSynthesizer {
    async fn speak(&self, text: &str) -> SynthesisOutcome {
        let outcome = match self.speak_inner(text).await {
            Ok(()) => SynthesisOutcome::Completed,
            Err(e) => e.into(),
        };
        report(&outcome);
        outcome
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Records every spoken text instead of playing it.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub spoken: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSynthesizer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Synthesizer for RecordingSynthesizer {
    async fn speak(&self, text: &str) -> SynthesisOutcome {
        self.spoken.lock().unwrap().push(text.to_string());
        SynthesisOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_region() {
        assert_eq!(
            synthesis_url("westeurope"),
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );
    }

    #[test]
    fn from_config_reads_voice_and_region() {
        let mut config = AppConfig::default();
        config.speech.region = Some("eastus".into());
        let s = SpeechServiceSynthesizer::from_config(&config);
        assert_eq!(s.url, synthesis_url("eastus"));
        assert_eq!(s.voice, "es-BO-MarceloNeural");
    }

    #[test]
    fn auth_failure_becomes_error_cancellation() {
        let outcome: SynthesisOutcome = SpeechError::Http(HttpError::Status {
            status: 401,
            body: "Unauthorized".into(),
        })
        .into();
        assert_eq!(
            outcome,
            SynthesisOutcome::Canceled {
                reason: CancellationReason::Error,
                error_details: Some("401: Unauthorized".into()),
            }
        );
    }

    #[test]
    fn narration_for_completed() {
        assert_eq!(
            narration(&SynthesisOutcome::Completed),
            vec![(log::Level::Info, "Speech synthesized successfully.".to_string())]
        );
    }

    #[test]
    fn narration_for_non_error_cancellation_has_no_hint() {
        let lines = narration(&SynthesisOutcome::Canceled {
            reason: CancellationReason::CancelledByUser,
            error_details: None,
        });
        assert_eq!(
            lines,
            vec![(
                log::Level::Warn,
                "Speech synthesis canceled: CancelledByUser".to_string()
            )]
        );
    }

    #[test]
    fn narration_for_error_includes_details_and_hint() {
        let outcome = SynthesisOutcome::Canceled {
            reason: CancellationReason::Error,
            error_details: Some("401: Unauthorized".into()),
        };
        let text: Vec<String> = narration(&outcome).into_iter().map(|(_, l)| l).collect();
        assert_eq!(
            text,
            vec![
                "Speech synthesis canceled: Error",
                "Error details: 401: Unauthorized",
                "Did you set the speech resource key and region values?",
            ]
        );
        report(&outcome);
    }

    #[tokio::test]
    async fn unreachable_service_cancels_without_playing() {
        let s = SpeechServiceSynthesizer {
            client: client_with_timeout(2),
            url: "http://127.0.0.1:9/cognitiveservices/v1".into(),
            key: String::new(),
            voice: "es-BO-MarceloNeural".into(),
        };
        let outcome = s.speak("hola").await;
        assert!(matches!(
            outcome,
            SynthesisOutcome::Canceled {
                reason: CancellationReason::Error,
                error_details: Some(_),
            }
        ));
    }

    #[tokio::test]
    async fn recording_double_keeps_order() {
        let s = RecordingSynthesizer::default();
        s.speak("uno").await;
        s.speak("dos").await;
        assert_eq!(s.spoken(), vec!["uno", "dos"]);
    }
}
