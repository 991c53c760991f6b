//! Typed results of gateway operations.
//!
//! Service failures and malformed replies are values here, never errors: each
//! outcome still yields something the caller can store or display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use competency::{CompetencyArea, RagStatus};

use crate::markup;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Feedback recorded when the service call itself fails.
pub const SERVICE_FAILURE_FEEDBACK: &str =
    "Error analyzing evidence with AI. Please check your connection or try again later.";

/// Feedback used when nothing usable can be salvaged from a reply.
pub const UNPARSEABLE_FEEDBACK: &str =
    "AI analysis issue. Could not parse response. Please try rephrasing evidence.";

/// A rating and the feedback explaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub rag_status: RagStatus,
    pub feedback: String,
}

impl Assessment {
    pub fn new(rag_status: RagStatus, feedback: impl Into<String>) -> Self {
        Self {
            rag_status,
            feedback: feedback.into(),
        }
    }
}

/// How an assessment was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    /// Reply was JSON with a recognised status.
    Parsed { assessment: Assessment },

    /// Reply was JSON but its status was missing or unrecognised; the status
    /// was guessed from the reply text.
    LowConfidence {
        assessment: Assessment,
        reported_status: Option<String>,
    },

    /// Reply could not be parsed as JSON; the status was guessed from the text.
    Unparseable { assessment: Assessment, raw: String },

    /// The service call failed; the fixed Red fail-safe applies.
    ServiceFailure { assessment: Assessment, error: String },
}

impl AssessmentOutcome {
    /// The fail-safe outcome for a failed call.
    pub fn service_failure(error: impl Into<String>) -> Self {
        Self::ServiceFailure {
            assessment: Assessment::new(RagStatus::Red, SERVICE_FAILURE_FEEDBACK),
            error: error.into(),
        }
    }

    pub fn assessment(&self) -> &Assessment {
        match self {
            Self::Parsed { assessment }
            | Self::LowConfidence { assessment, .. }
            | Self::Unparseable { assessment, .. }
            | Self::ServiceFailure { assessment, .. } => assessment,
        }
    }

    pub fn rag_status(&self) -> RagStatus {
        self.assessment().rag_status
    }

    /// Whether the status came straight from a well-formed reply.
    pub fn is_confident(&self) -> bool {
        matches!(self, Self::Parsed { .. })
    }

    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::ServiceFailure { .. })
    }
}

/// Result of one drafting call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftOutcome {
    /// Narrative with placeholders already styled
    Drafted { html: String },
    /// Nothing to draft from
    NoEvidence { message: String },
    /// The call failed; `message` is safe to show in place of the draft
    Failed { message: String, error: String },
}

impl DraftOutcome {
    /// Displayable HTML for any outcome.
    pub fn html(&self) -> String {
        match self {
            Self::Drafted { html } => html.clone(),
            Self::NoEvidence { message } => message.clone(),
            Self::Failed { message, .. } => message.clone(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Draft for one competency area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct AreaDraft {
    pub area: CompetencyArea,
    pub outcome: DraftOutcome,
}

/// A full application: one draft per area, in area order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ApplicationDraft {
    pub generated_at: DateTime<Utc>,
    pub areas: Vec<AreaDraft>,
}

impl ApplicationDraft {
    /// Areas whose drafting call failed.
    pub fn failed_areas(&self) -> impl Iterator<Item = &AreaDraft> {
        self.areas.iter().filter(|a| a.outcome.is_failed())
    }

    /// Render the report as a single HTML document.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str(&format!("<h1>{}</h1>\n", markup::REPORT_TITLE));
        html.push_str(&format!(
            "<p>Generated on: {}</p>\n",
            self.generated_at.format("%Y-%m-%d")
        ));

        for area in &self.areas {
            html.push_str(&format!(
                "<h2>Area {}: {}</h2>\n",
                area.area.code, area.area.title
            ));
            html.push_str(&format!(
                "<div class=\"area-draft\">{}</div>\n",
                area.outcome.html()
            ));
        }

        html
    }

    /// Plain-text rendering for copying.
    pub fn to_text(&self) -> String {
        markup::strip_markup(&self.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use competency::CompetencyAreaCode;

    #[test]
    fn test_service_failure_is_red() {
        let outcome = AssessmentOutcome::service_failure("timeout");

        assert_eq!(outcome.rag_status(), RagStatus::Red);
        assert_eq!(outcome.assessment().feedback, SERVICE_FAILURE_FEEDBACK);
        assert!(outcome.is_service_failure());
        assert!(!outcome.is_confident());
    }

    #[test]
    fn test_report_html_keeps_area_order() {
        let area = |code, title: &str| CompetencyArea {
            code,
            title: title.to_string(),
        };
        let draft = ApplicationDraft {
            generated_at: Utc::now(),
            areas: vec![
                AreaDraft {
                    area: area(CompetencyAreaCode::A, "Knowledge"),
                    outcome: DraftOutcome::Drafted {
                        html: "<p>I researched.</p>".to_string(),
                    },
                },
                AreaDraft {
                    area: area(CompetencyAreaCode::B, "Design"),
                    outcome: DraftOutcome::Failed {
                        message: "<p>Error for B</p>".to_string(),
                        error: "timeout".to_string(),
                    },
                },
            ],
        };

        let html = draft.to_html();
        let a = html.find("Area A: Knowledge").unwrap();
        let b = html.find("Area B: Design").unwrap();
        assert!(a < b);
        assert!(html.contains("<p>Error for B</p>"));
        assert_eq!(draft.failed_areas().count(), 1);
        assert!(draft.to_text().contains("I researched."));
    }
}
