//! What a finished turn produced.
//!
//! Each turn ends at exactly one [`TurnStage`]; the [`TurnOutcome`] records
//! that stage, the text that was spoken and how synthesis went.

use crate::tts::SynthesisOutcome;

// ---------------------------------------------------------------------------
// TurnStage
// ---------------------------------------------------------------------------

/// The exit a turn took.
///
/// ```text
/// utterance ──no wake word──────────▶ MissingWakeWord
///           ──moderator: unsafe────▶ Blocked
///           ──no person / empty────▶ OutOfScope
///           ──no biography─────────▶ NoInformation
///           ──biography found──────▶ Answered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    MissingWakeWord,
    Blocked,
    OutOfScope,
    NoInformation,
    Answered,
}

impl TurnStage {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            TurnStage::MissingWakeWord => "missing wake word",
            TurnStage::Blocked => "blocked",
            TurnStage::OutOfScope => "out of scope",
            TurnStage::NoInformation => "no information",
            TurnStage::Answered => "answered",
        }
    }
}

// ---------------------------------------------------------------------------
// TurnOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub stage: TurnStage,
    /// The text handed to the synthesizer; never empty.
    pub text: String,
    pub synthesis: SynthesisOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(TurnStage::Blocked.label(), "blocked");
        assert_eq!(TurnStage::Answered.label(), "answered");
    }
}
