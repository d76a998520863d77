//! Application settings structs, defaults, TOML persistence and the
//! credential overlay read from the environment.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`.
//! `AppConfig` is built once at start-up and handed by reference to every
//! collaborator adapter's `from_config` constructor.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AssistantConfig
// ---------------------------------------------------------------------------

/// Turn-level behaviour: the wake word and the language documents are sent in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Literal token that must appear somewhere in the utterance.
    ///
    /// Matched case-sensitively as a raw substring.
    pub wake_word: String,
    /// ISO-639-1 language of the documents sent to the language service.
    pub document_language: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            wake_word: "Alessandro".into(),
            document_language: "es".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Speech service settings shared by recognition and synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Subscription key (`SPEECH_KEY`).
    pub key: Option<String>,
    /// Azure region, e.g. `"westeurope"` (`SPEECH_REGION`).
    pub region: Option<String>,
    /// BCP-47 locale used for recognition.
    pub recognition_language: String,
    /// Neural voice used for synthesis.  The SSML `xml:lang` is derived from
    /// its locale prefix.
    pub voice_name: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            key: None,
            region: None,
            recognition_language: "es-ES".into(),
            voice_name: "es-BO-MarceloNeural".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ContentSafetyConfig
// ---------------------------------------------------------------------------

/// Content moderation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSafetyConfig {
    /// Resource endpoint, e.g. `https://<name>.cognitiveservices.azure.com`.
    pub endpoint: String,
    /// Resource key (`CONTENT_SAFETY_KEY`).
    pub key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ContentSafetyConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            key: None,
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// LanguageConfig
// ---------------------------------------------------------------------------

/// Language service settings (entity recognition + extractive summarization).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Resource endpoint (`LANGUAGE_ENDPOINT`).
    pub endpoint: String,
    /// Resource key (`LANGUAGE_KEY`).
    pub key: Option<String>,
    /// Upper bound on sentences the extractive summary may select.
    pub summary_sentence_count: u32,
    /// Delay between polls of a summarization job, in milliseconds.
    pub poll_interval_ms: u64,
    /// Polls attempted before a summarization job is given up on.
    pub max_polls: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            key: None,
            summary_sentence_count: 4,
            poll_interval_ms: 500,
            max_polls: 60,
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// KnowledgeConfig
// ---------------------------------------------------------------------------

/// Knowledge Graph search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Search endpoint (`API_GOOGLE_ENDPOINT`).
    pub endpoint: String,
    /// API key (`API_GOOGLE_KEY`).
    pub key: Option<String>,
    /// Value of the `languages` query parameter.
    pub languages: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://kgsearch.googleapis.com/v1/entities:search".into(),
            key: None,
            languages: "es".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Microphone capture and utterance endpointing.
///
/// These are the only bounds on the transcriber's wait time; the turn
/// pipeline itself never times out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// RMS amplitude above which a 30 ms frame counts as speech.
    pub vad_threshold: f32,
    /// Give up with "no match" when no speech starts within this many seconds.
    pub initial_silence_secs: f32,
    /// Silence after speech that closes the utterance, in milliseconds.
    pub trailing_silence_ms: u64,
    /// Hard cap on utterance length in seconds.
    pub max_utterance_secs: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            vad_threshold: 0.01,
            initial_silence_secs: 5.0,
            trailing_silence_ms: 800,
            max_utterance_secs: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use alessandro::config::AppConfig;
///
/// let mut config = AppConfig::load().unwrap();
/// config.apply_env();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assistant: AssistantConfig,
    pub speech: SpeechConfig,
    pub content_safety: ContentSafetyConfig,
    pub language: LanguageConfig,
    pub knowledge: KnowledgeConfig,
    pub capture: CaptureConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay credentials and endpoints from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Overlay credentials and endpoints from `lookup`.
    ///
    /// Only non-empty values override what the TOML file provided.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SPEECH_KEY") {
            self.speech.key = Some(v);
        }
        if let Some(v) = get("SPEECH_REGION") {
            self.speech.region = Some(v);
        }
        if let Some(v) = get("CONTENT_SAFETY_ENDPOINT") {
            self.content_safety.endpoint = v;
        }
        if let Some(v) = get("CONTENT_SAFETY_KEY") {
            self.content_safety.key = Some(v);
        }
        if let Some(v) = get("LANGUAGE_ENDPOINT") {
            self.language.endpoint = v;
        }
        if let Some(v) = get("LANGUAGE_KEY") {
            self.language.key = Some(v);
        }
        if let Some(v) = get("API_GOOGLE_ENDPOINT") {
            self.knowledge.endpoint = v;
        }
        if let Some(v) = get("API_GOOGLE_KEY") {
            self.knowledge.key = Some(v);
        }
    }

    /// Fail fast when a credential or endpoint needed by a turn is missing.
    ///
    /// The error lists every missing setting by its environment variable name.
    pub fn validate(&self) -> Result<()> {
        fn blank(v: Option<&str>) -> bool {
            v.map_or(true, |s| s.trim().is_empty())
        }

        let mut missing = Vec::new();
        if blank(self.speech.key.as_deref()) {
            missing.push("SPEECH_KEY");
        }
        if blank(self.speech.region.as_deref()) {
            missing.push("SPEECH_REGION");
        }
        if blank(Some(self.content_safety.endpoint.as_str())) {
            missing.push("CONTENT_SAFETY_ENDPOINT");
        }
        if blank(self.content_safety.key.as_deref()) {
            missing.push("CONTENT_SAFETY_KEY");
        }
        if blank(Some(self.language.endpoint.as_str())) {
            missing.push("LANGUAGE_ENDPOINT");
        }
        if blank(self.language.key.as_deref()) {
            missing.push("LANGUAGE_KEY");
        }
        if blank(Some(self.knowledge.endpoint.as_str())) {
            missing.push("API_GOOGLE_ENDPOINT");
        }
        if blank(self.knowledge.key.as_deref()) {
            missing.push("API_GOOGLE_KEY");
        }
        if self.assistant.wake_word.is_empty() {
            bail!("assistant.wake_word must not be empty");
        }

        if !missing.is_empty() {
            bail!("missing configuration: {}", missing.join(", "));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
