//! [`Transcriber`] trait and the speech-service implementation.
//!
//! [`SpeechServiceTranscriber`] records one utterance from the default
//! microphone, encodes it as 16 kHz WAV, and posts it to the short-audio
//! recognition REST endpoint.  It never returns an error: capture and
//! transport failures are folded into [`Recognition::Canceled`].

use async_trait::async_trait;

use crate::audio::{encode_wav, AudioCapture, UtteranceDetector, TARGET_RATE};
use crate::config::{AppConfig, CaptureConfig};
use crate::http::{client_with_timeout, ensure_success, HttpError, SUBSCRIPTION_KEY_HEADER};
use crate::stt::recognition::{parse_simple_response, Recognition};

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Captures and recognises exactly one utterance per call.
///
/// Blocks (asynchronously) until the capture session detects an utterance
/// boundary or gives up; there is no timeout beyond the capture settings.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn recognize_once(&self) -> Recognition;
}

// ---------------------------------------------------------------------------
// SpeechServiceTranscriber
// ---------------------------------------------------------------------------

pub struct SpeechServiceTranscriber {
    client: reqwest::Client,
    url: String,
    key: String,
    capture: CaptureConfig,
}

impl SpeechServiceTranscriber {
    pub fn from_config(config: &AppConfig) -> Self {
        let region = config.speech.region.as_deref().unwrap_or_default();
        Self {
            client: client_with_timeout(config.speech.timeout_secs),
            url: recognition_url(region, &config.speech.recognition_language),
            key: config.speech.key.clone().unwrap_or_default(),
            capture: config.capture.clone(),
        }
    }

    /// The endpoint this transcriber posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn upload(&self, wav: Vec<u8>) -> Result<Recognition, HttpError> {
        let response = self
            .client
            .post(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/wav; codecs=audio/pcm; samplerate={TARGET_RATE}"),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .body(wav)
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        Ok(parse_simple_response(&body))
    }
}

/// Short-audio recognition endpoint for `region`, returning `format=simple`.
pub fn recognition_url(region: &str, language: &str) -> String {
    format!(
        "https://{region}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={language}&format=simple"
    )
}

#[async_trait]
impl Transcriber for SpeechServiceTranscriber {
    async fn recognize_once(&self) -> Recognition {
        let capture = self.capture.clone();
        let recorded = tokio::task::spawn_blocking(move || {
            AudioCapture::new()?.record_utterance(UtteranceDetector::from_config(&capture))
        })
        .await;

        let samples = match recorded {
            Ok(Ok(Some(samples))) => samples,
            Ok(Ok(None)) => {
                log::debug!("stt: no speech before the initial-silence limit");
                return Recognition::NoMatch;
            }
            Ok(Err(e)) => return Recognition::error(format!("audio capture failed: {e}")),
            Err(e) => return Recognition::error(format!("capture task failed: {e}")),
        };

        log::debug!(
            "stt: captured {:.2} s of speech",
            samples.len() as f32 / TARGET_RATE as f32
        );

        let wav = match encode_wav(&samples, TARGET_RATE) {
            Ok(wav) => wav,
            Err(e) => return Recognition::error(format!("WAV encoding failed: {e}")),
        };

        match self.upload(wav).await {
            Ok(recognition) => recognition,
            Err(e) => Recognition::error(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// Test double that returns a fixed [`Recognition`] without touching audio.
#[cfg(test)]
pub struct ScriptedTranscriber {
    response: Recognition,
}

#[cfg(test)]
impl ScriptedTranscriber {
    pub fn heard(text: impl Into<String>) -> Self {
        Self {
            response: Recognition::Recognized(text.into()),
        }
    }

    pub fn returning(response: Recognition) -> Self {
        Self { response }
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn recognize_once(&self) -> Recognition {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_embeds_region_and_language() {
        assert_eq!(
            recognition_url("westeurope", "es-ES"),
            "https://westeurope.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language=es-ES&format=simple"
        );
    }

    #[test]
    fn from_config_uses_speech_settings() {
        let mut config = AppConfig::default();
        config.speech.region = Some("eastus".into());
        config.speech.key = Some("k".into());
        let t = SpeechServiceTranscriber::from_config(&config);
        assert!(t.url().starts_with("https://eastus.stt."));
        assert!(t.url().contains("language=es-ES"));
    }

    #[test]
    fn transcriber_is_object_safe() {
        let _: Box<dyn Transcriber> = Box::new(ScriptedTranscriber::heard("hola"));
    }

    #[tokio::test]
    async fn scripted_transcriber_replays_response() {
        let t = ScriptedTranscriber::returning(Recognition::NoMatch);
        assert_eq!(t.recognize_once().await, Recognition::NoMatch);
        assert_eq!(t.recognize_once().await, Recognition::NoMatch);
    }
}
