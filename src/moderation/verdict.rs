//! [`ModerationVerdict`] and the content-safety `text:analyze` wire format.

use serde::Deserialize;

/// Severity reported for each harm category.
///
/// `None` means the service did not report the category.  Any reported
/// severity other than zero blocks the request; there is no threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub hate: Option<u8>,
    pub self_harm: Option<u8>,
    pub sexual: Option<u8>,
    pub violence: Option<u8>,
}

impl ModerationVerdict {
    /// `true` when any category carries a non-zero severity.
    pub fn is_blocked(&self) -> bool {
        [self.hate, self.self_harm, self.sexual, self.violence]
            .iter()
            .any(|s| matches!(s, Some(sev) if *sev != 0))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeTextResponse {
    #[serde(default)]
    pub categories_analysis: Vec<CategoryAnalysis>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryAnalysis {
    pub category: String,
    #[serde(default)]
    pub severity: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl From<AnalyzeTextResponse> for ModerationVerdict {
    fn from(response: AnalyzeTextResponse) -> Self {
        let mut verdict = ModerationVerdict::default();
        for item in response.categories_analysis {
            let slot = match item.category.as_str() {
                "Hate" => &mut verdict.hate,
                "SelfHarm" => &mut verdict.self_harm,
                "Sexual" => &mut verdict.sexual,
                "Violence" => &mut verdict.violence,
                other => {
                    log::debug!("moderation: ignoring unknown category {other}");
                    continue;
                }
            };
            *slot = item.severity;
        }
        verdict
    }
}
