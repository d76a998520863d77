//! Turn pipeline: drives one utterance through to one spoken reply.
//!
//! [`TurnPipeline`] holds one `Arc<dyn …>` per collaborator and runs the
//! stages strictly in order, each awaited before the next starts.
//!
//! # Turn flow
//!
//! ```text
//! transcriber.recognize_once()
//!   └─▶ nothing understood                      → Ok(None), nothing spoken
//!   └─▶ wake word absent                        → MissingWakeWord apology
//!         └─▶ strip wake word, trim
//!               ├─ empty                        → OutOfScope apology
//!               ├─ moderator.is_unsafe  (Err ⇒ turn fails, nothing spoken)
//!               │     └─ unsafe                 → OffensiveContent apology
//!               ├─ extractor.find_person  None  → OutOfScope apology
//!               ├─ knowledge.describe     None  → NoInformation { name }
//!               └─ summarizer.summarize
//!                     └─ fallback / blank       → speak biography
//!                     └─ sentence               → speak sentence
//! ```
//!
//! Exactly one call to the synthesizer happens per `Ok(Some(_))` turn.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::knowledge::{KnowledgeGraphLookup, KnowledgeLookup};
use crate::language::{
    EntityExtractor, LanguageClient, LanguageEntityExtractor, LanguageSummarizer, Summarizer,
    SUMMARY_FALLBACK,
};
use crate::moderation::{ContentSafetyModerator, ModerationError, Moderator};
use crate::stt::{CancellationReason, Recognition, SpeechServiceTranscriber, Transcriber};
use crate::tts::{SpeechServiceSynthesizer, Synthesizer};

use super::responses::Apology;
use super::state::{TurnOutcome, TurnStage};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Failures that abort a turn without speaking.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The moderator could not classify the request.
    #[error("moderation failed: {0}")]
    Moderation(#[from] ModerationError),
}

// ---------------------------------------------------------------------------
// TurnPipeline
// ---------------------------------------------------------------------------

pub struct TurnPipeline {
    wake_word: String,
    transcriber: Arc<dyn Transcriber>,
    moderator: Arc<dyn Moderator>,
    extractor: Arc<dyn EntityExtractor>,
    knowledge: Arc<dyn KnowledgeLookup>,
    summarizer: Arc<dyn Summarizer>,
    synthesizer: Arc<dyn Synthesizer>,
}

impl TurnPipeline {
    pub fn new(
        wake_word: impl Into<String>,
        transcriber: Arc<dyn Transcriber>,
        moderator: Arc<dyn Moderator>,
        extractor: Arc<dyn EntityExtractor>,
        knowledge: Arc<dyn KnowledgeLookup>,
        summarizer: Arc<dyn Summarizer>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            wake_word: wake_word.into(),
            transcriber,
            moderator,
            extractor,
            knowledge,
            summarizer,
            synthesizer,
        }
    }

    /// Wire the remote service adapters described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let language = Arc::new(LanguageClient::from_config(config));
        Self::new(
            config.assistant.wake_word.clone(),
            Arc::new(SpeechServiceTranscriber::from_config(config)),
            Arc::new(ContentSafetyModerator::from_config(config)),
            Arc::new(LanguageEntityExtractor::new(Arc::clone(&language))),
            Arc::new(KnowledgeGraphLookup::from_config(config)),
            Arc::new(LanguageSummarizer::new(language)),
            Arc::new(SpeechServiceSynthesizer::from_config(config)),
        )
    }

    // -----------------------------------------------------------------------
    // Turn
    // -----------------------------------------------------------------------

    /// Run one turn end to end.
    ///
    /// Returns `Ok(None)` when nothing was understood (nothing is spoken),
    /// `Ok(Some(_))` after exactly one reply was spoken, and `Err` when the
    /// moderator failed.
    pub async fn run_turn(&self) -> Result<Option<TurnOutcome>, PipelineError> {
        log::info!("Hable ahora...");
        let recognition = self.transcriber.recognize_once().await;

        let Some(utterance) = narrate(recognition) else {
            log::info!("No se pudo reconocer el discurso correctamente.");
            return Ok(None);
        };

        if !utterance.contains(self.wake_word.as_str()) {
            let apology = Apology::MissingWakeWord {
                wake_word: self.wake_word.clone(),
            };
            return Ok(Some(self.apologize(TurnStage::MissingWakeWord, apology).await));
        }

        let request = strip_wake_word(&utterance, &self.wake_word);
        if request.is_empty() {
            log::debug!("pipeline: utterance held only the wake word");
            return Ok(Some(self.apologize(TurnStage::OutOfScope, Apology::OutOfScope).await));
        }

        if self.moderator.is_unsafe(&request).await? {
            return Ok(Some(
                self.apologize(TurnStage::Blocked, Apology::OffensiveContent).await,
            ));
        }

        let Some(name) = non_blank(self.extractor.find_person(&request).await) else {
            return Ok(Some(self.apologize(TurnStage::OutOfScope, Apology::OutOfScope).await));
        };
        log::debug!("pipeline: person = {name:?}");

        let Some(biography) = non_blank(self.knowledge.describe(&name).await) else {
            let apology = Apology::NoInformation { name };
            return Ok(Some(self.apologize(TurnStage::NoInformation, apology).await));
        };

        let summary = self.summarizer.summarize(&biography).await;
        let answer = choose_answer(summary, biography);

        Ok(Some(self.say(TurnStage::Answered, answer).await))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn apologize(&self, stage: TurnStage, apology: Apology) -> TurnOutcome {
        self.say(stage, apology.message()).await
    }

    async fn say(&self, stage: TurnStage, text: String) -> TurnOutcome {
        log::debug!("pipeline: turn ended ({})", stage.label());
        let synthesis = self.synthesizer.speak(&text).await;
        TurnOutcome {
            stage,
            text,
            synthesis,
        }
    }
}

/// Log the recognition result and return the utterance, if there is one.
fn narrate(recognition: Recognition) -> Option<String> {
    match recognition {
        Recognition::Recognized(text) if !text.trim().is_empty() => {
            log::info!("Reconocido: {text}");
            Some(text)
        }
        Recognition::Recognized(_) | Recognition::NoMatch => {
            log::info!("No se reconoció el discurso correctamente.");
            None
        }
        Recognition::Canceled {
            reason,
            error_details,
        } => {
            log::info!("Reconocimiento cancelado: {reason}");
            if reason == CancellationReason::Error {
                if let Some(details) = error_details {
                    log::info!("Detalles del error: {details}");
                }
            }
            None
        }
    }
}

/// Blank values count as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Remove every occurrence of `wake_word` and trim the remainder.
pub fn strip_wake_word(utterance: &str, wake_word: &str) -> String {
    utterance.replace(wake_word, "").trim().to_string()
}

/// The summary, unless it is the fallback sentinel or blank.
fn choose_answer(summary: String, biography: String) -> String {
    let summary = summary.trim();
    if summary.is_empty() || summary == SUMMARY_FALLBACK {
        biography
    } else {
        summary.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
