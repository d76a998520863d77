//! Fixed spoken replies for turns that end before an answer is found.

use std::fmt;

/// A canned apology, one per early exit of the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Apology {
    /// The utterance did not contain the wake word.
    MissingWakeWord { wake_word: String },
    /// The moderator flagged the request.
    OffensiveContent,
    /// No person could be identified in the request.
    OutOfScope,
    /// The knowledge lookup had nothing for `name`.
    NoInformation { name: String },
}

impl Apology {
    pub fn message(&self) -> String {
        match self {
            Apology::MissingWakeWord { wake_word } => format!(
                "Por favor, comienza tu pregunta con '{wake_word}' seguido de la figura pública de tu interés."
            ),
            Apology::OffensiveContent => {
                "Lo siento, no puedo ayudarte porque he detectado contenido ofensivo en tu pregunta."
                    .to_string()
            }
            Apology::OutOfScope => {
                "Lo siento, soy un asistente únicamente orientado a darte información sobre figuras públicas."
                    .to_string()
            }
            Apology::NoInformation { name } => {
                format!("Lo siento, no puedo ayudarte porque no tengo información sobre {name}.")
            }
        }
    }
}

impl fmt::Display for Apology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_default_wake_word() {
        let a = Apology::MissingWakeWord {
            wake_word: "Alessandro".into(),
        };
        assert_eq!(
            a.message(),
            "Por favor, comienza tu pregunta con 'Alessandro' seguido de la figura pública de tu interés."
        );
    }

    #[test]
    fn instruction_follows_configured_wake_word() {
        let a = Apology::MissingWakeWord {
            wake_word: "Lucía".into(),
        };
        assert!(a.message().contains("con 'Lucía' seguido"));
    }

    #[test]
    fn fixed_apologies() {
        assert_eq!(
            Apology::OffensiveContent.message(),
            "Lo siento, no puedo ayudarte porque he detectado contenido ofensivo en tu pregunta."
        );
        assert_eq!(
            Apology::OutOfScope.message(),
            "Lo siento, soy un asistente únicamente orientado a darte información sobre figuras públicas."
        );
    }

    #[test]
    fn no_information_interpolates_name() {
        let a = Apology::NoInformation {
            name: "Zxqv Blorp".into(),
        };
        assert_eq!(
            a.to_string(),
            "Lo siento, no puedo ayudarte porque no tengo información sobre Zxqv Blorp."
        );
    }
}
