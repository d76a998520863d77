//! Result types for a single recognition attempt and the parser for the
//! speech service's `format=simple` response.

use std::fmt;

use serde::Deserialize;

/// Why a recognition or synthesis request was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The service or the local audio path failed; details are attached.
    Error,
    /// The audio source ended before anything could be produced.
    EndOfStream,
    /// The request was cancelled by the user or the service.
    CancelledByUser,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CancellationReason::Error => "Error",
            CancellationReason::EndOfStream => "EndOfStream",
            CancellationReason::CancelledByUser => "CancelledByUser",
        };
        f.write_str(name)
    }
}

/// Outcome of capturing and recognising one utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    /// Speech was recognised; the text is non-empty.
    Recognized(String),
    /// Audio was captured but no speech could be matched.
    NoMatch,
    /// Recognition did not complete.
    Canceled {
        reason: CancellationReason,
        error_details: Option<String>,
    },
}

impl Recognition {
    /// Cancellation caused by an error, with a diagnostic message.
    pub fn error(details: impl Into<String>) -> Self {
        Recognition::Canceled {
            reason: CancellationReason::Error,
            error_details: Some(details.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: Option<String>,
}

/// Map a short-audio recognition response body onto [`Recognition`].
///
/// `Success` with blank text is reported as [`Recognition::NoMatch`].
pub(crate) fn parse_simple_response(body: &str) -> Recognition {
    let response: SimpleResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Recognition::error(format!("unreadable recognition response: {e}")),
    };

    match response.recognition_status.as_str() {
        "Success" => match response.display_text {
            Some(text) if !text.trim().is_empty() => Recognition::Recognized(text.trim().to_string()),
            _ => Recognition::NoMatch,
        },
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => Recognition::NoMatch,
        "EndOfDictation" => Recognition::Canceled {
            reason: CancellationReason::EndOfStream,
            error_details: None,
        },
        other => Recognition::error(format!("recognition status {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_yields_trimmed_text() {
        let body = json!({
            "RecognitionStatus": "Success",
            "DisplayText": " Alessandro, cuéntame sobre Marie Curie. ",
            "Offset": 1800000,
            "Duration": 32100000
        })
        .to_string();
        assert_eq!(
            parse_simple_response(&body),
            Recognition::Recognized("Alessandro, cuéntame sobre Marie Curie.".into())
        );
    }

    #[test]
    fn silence_statuses_are_no_match() {
        for status in ["NoMatch", "InitialSilenceTimeout", "BabbleTimeout"] {
            let body = json!({ "RecognitionStatus": status }).to_string();
            assert_eq!(parse_simple_response(&body), Recognition::NoMatch, "{status}");
        }
    }

    #[test]
    fn blank_success_is_no_match() {
        let body = json!({ "RecognitionStatus": "Success", "DisplayText": "  " }).to_string();
        assert_eq!(parse_simple_response(&body), Recognition::NoMatch);
    }

    #[test]
    fn error_status_is_cancellation_with_details() {
        let body = json!({ "RecognitionStatus": "Error" }).to_string();
        match parse_simple_response(&body) {
            Recognition::Canceled {
                reason,
                error_details,
            } => {
                assert_eq!(reason, CancellationReason::Error);
                assert!(error_details.unwrap().contains("Error"));
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_cancellation() {
        assert!(matches!(
            parse_simple_response("<html>"),
            Recognition::Canceled {
                reason: CancellationReason::Error,
                ..
            }
        ));
    }
}
