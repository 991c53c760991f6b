//! AssessmentGateway - entry point for assessment and drafting calls.
//!
//! Every operation returns a value: service failures become the fail-safe Red
//! assessment or a displayable error string, never an `Err`.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info};

use competency::{
    CompetencyArea, CompetencyCatalog, EvidenceCollection, EvidenceItem, SubCompetency,
};

use crate::backend::traits::{CompletionRequest, LlmBackend};
use crate::config::GatewayConfig;
use crate::markup;
use crate::parse::interpret_assessment;
use crate::prompt::PromptBuilder;
use crate::response::{AreaDraft, ApplicationDraft, AssessmentOutcome, DraftOutcome};

/// Builds prompts, calls the backend and types its replies.
pub struct AssessmentGateway {
    config: GatewayConfig,
    backend: Arc<dyn LlmBackend>,
}

impl AssessmentGateway {
    /// Create a gateway over the given backend with default settings.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            config: GatewayConfig::default(),
            backend,
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Identifier of the backend in use.
    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Rate one piece of evidence against a sub-competency.
    pub async fn assess_evidence(
        &self,
        content: &str,
        sub: &SubCompetency,
        file_name: Option<&str>,
    ) -> AssessmentOutcome {
        let prompt =
            PromptBuilder::assessment(content, sub, file_name, self.config.feedback_word_limit);
        let request = CompletionRequest::user(prompt)
            .with_temperature(self.config.assessment_temperature)
            .with_max_tokens(self.config.max_output_tokens)
            .with_json_output();

        debug!(code = %sub.code, backend = %self.backend.id(), "Requesting assessment");

        match self.backend.complete(request).await {
            Ok(completion) => {
                let outcome = interpret_assessment(&completion.content);
                info!(
                    code = %sub.code,
                    rag_status = %outcome.rag_status(),
                    confident = outcome.is_confident(),
                    tokens = completion.usage.total(),
                    "Evidence assessed"
                );
                outcome
            }
            Err(err) => {
                error!(code = %sub.code, error = %err, "Assessment call failed");
                AssessmentOutcome::service_failure(err.to_string())
            }
        }
    }

    /// Draft one report section from selected items.
    pub async fn draft_section(
        &self,
        area_title: &str,
        representative_code: &str,
        items: &[EvidenceItem],
    ) -> DraftOutcome {
        if items.is_empty() {
            return DraftOutcome::NoEvidence {
                message: markup::NO_SECTION_EVIDENCE.to_string(),
            };
        }

        let prompt = PromptBuilder::section_draft(area_title, representative_code, items);
        let request = CompletionRequest::user(prompt)
            .with_temperature(self.config.section_temperature)
            .with_max_tokens(self.config.max_output_tokens);

        debug!(area = %area_title, items = items.len(), "Requesting section draft");

        match self.backend.complete(request).await {
            Ok(completion) => DraftOutcome::Drafted {
                html: markup::style_placeholders(&completion.content),
            },
            Err(err) => {
                error!(area = %area_title, error = %err, "Section draft failed");
                DraftOutcome::Failed {
                    message: markup::SECTION_DRAFT_ERROR.to_string(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// Draft the narrative for a whole area from the current evidence.
    pub async fn draft_area_narrative<'a>(
        &self,
        area: &CompetencyArea,
        subs: impl IntoIterator<Item = &'a SubCompetency>,
        evidence: &EvidenceCollection,
    ) -> DraftOutcome {
        let prompt = PromptBuilder::area_draft(area, subs, evidence);
        let request = CompletionRequest::user(prompt)
            .with_temperature(self.config.area_temperature)
            .with_max_tokens(self.config.max_output_tokens);

        debug!(area = %area.code, "Requesting area draft");

        match self.backend.complete(request).await {
            Ok(completion) => DraftOutcome::Drafted {
                html: markup::style_placeholders(&completion.content),
            },
            Err(err) => {
                error!(area = %area.code, error = %err, "Area draft failed");
                DraftOutcome::Failed {
                    message: markup::area_draft_error(area.code.as_str()),
                    error: err.to_string(),
                }
            }
        }
    }

    /// Draft every area concurrently. A failed area carries its error string
    /// and does not affect the others.
    pub async fn draft_full_application(
        &self,
        catalog: &CompetencyCatalog,
        evidence: &EvidenceCollection,
    ) -> ApplicationDraft {
        let drafts = catalog.areas().iter().map(|area| async move {
            let outcome = self
                .draft_area_narrative(area, catalog.in_area(area.code), evidence)
                .await;
            AreaDraft {
                area: area.clone(),
                outcome,
            }
        });

        let areas = join_all(drafts).await;
        let draft = ApplicationDraft {
            generated_at: Utc::now(),
            areas,
        };

        info!(
            areas = draft.areas.len(),
            failed = draft.failed_areas().count(),
            "Full application drafted"
        );
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LlmError, MockBackend};
    use crate::markup::{ELABORATE_PLACEHOLDER_CLASS, SECTION_DRAFT_ERROR};
    use crate::response::{Assessment, SERVICE_FAILURE_FEEDBACK};
    use competency::{CompetencyAreaCode, RagStatus};

    fn gateway(backend: Arc<MockBackend>) -> AssessmentGateway {
        AssessmentGateway::new(backend)
    }

    #[tokio::test]
    async fn test_fenced_reply_parsed() {
        let backend = Arc::new(MockBackend::default().with_response(
            "```json\n{\"ragStatus\":\"Green\",\"feedback\":\"Good.\"}\n```",
        ));
        let catalog = CompetencyCatalog::reference();
        let outcome = gateway(backend.clone())
            .assess_evidence("Led the design", catalog.get("B1").unwrap(), None)
            .await;

        assert_eq!(
            outcome.assessment(),
            &Assessment::new(RagStatus::Green, "Good.")
        );
        assert!(outcome.is_confident());
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_plain_reply_uses_heuristic() {
        let backend =
            Arc::new(MockBackend::default().with_response("This looks green but no json"));
        let catalog = CompetencyCatalog::reference();
        let outcome = gateway(backend)
            .assess_evidence("Led the design", catalog.get("B1").unwrap(), None)
            .await;

        assert_eq!(outcome.rag_status(), RagStatus::Green);
        assert!(!outcome.assessment().feedback.is_empty());
        assert!(!outcome.is_confident());
    }

    #[tokio::test]
    async fn test_service_failure_is_red() {
        let backend = Arc::new(MockBackend::default());
        backend.push_failure("connection refused");
        let catalog = CompetencyCatalog::reference();
        let outcome = gateway(backend)
            .assess_evidence("Led the design", catalog.get("B1").unwrap(), Some("plan.pdf"))
            .await;

        assert_eq!(
            outcome.assessment(),
            &Assessment::new(RagStatus::Red, SERVICE_FAILURE_FEEDBACK)
        );
        assert!(outcome.is_service_failure());
    }

    #[tokio::test]
    async fn test_section_without_items_skips_call() {
        let backend = Arc::new(MockBackend::default());
        let outcome = gateway(backend.clone()).draft_section("Design", "B1", &[]).await;

        assert_eq!(outcome.html(), markup::NO_SECTION_EVIDENCE);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_section_draft_styles_placeholders() {
        let backend = Arc::new(
            MockBackend::default().with_response("I led the review. [Add the budget]"),
        );
        let items = vec![EvidenceItem::text("C1", "user123", "Planned the work")
            .with_assessment(RagStatus::Green, "Clear")];
        let outcome = gateway(backend).draft_section("Leadership", "C1", &items).await;

        assert!(outcome.html().contains(ELABORATE_PLACEHOLDER_CLASS));
        assert!(outcome.html().contains("[Add the budget]</span>"));

        let failing = Arc::new(MockBackend::default());
        failing.push_failure("timeout");
        let outcome = gateway(failing).draft_section("Leadership", "C1", &items).await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.html(), SECTION_DRAFT_ERROR);
    }

    #[tokio::test]
    async fn test_full_application_isolates_failures() {
        let backend = Arc::new(MockBackend::default().with_responder(|request| {
            let prompt = request.prompt_text();
            if prompt.contains("Begin the draft for Competency Area C") {
                Err(LlmError::RequestFailed("quota".to_string()))
            } else {
                Ok("<p>I delivered the project.</p>".to_string())
            }
        }));
        let catalog = CompetencyCatalog::reference();
        let draft = gateway(backend.clone())
            .draft_full_application(&catalog, &EvidenceCollection::new())
            .await;

        assert_eq!(backend.call_count(), 5);
        let codes: Vec<_> = draft.areas.iter().map(|a| a.area.code).collect();
        assert_eq!(codes, CompetencyAreaCode::ALL);

        let failed: Vec<_> = draft.failed_areas().map(|a| a.area.code).collect();
        assert_eq!(failed, vec![CompetencyAreaCode::C]);
        assert!(draft
            .to_html()
            .contains("Error generating draft content for Area C"));
    }

    #[tokio::test]
    async fn test_uncovered_subs_get_marker_instruction() {
        let backend = Arc::new(MockBackend::default().with_response("draft"));
        let catalog = CompetencyCatalog::reference();
        let area = catalog.area(CompetencyAreaCode::D).unwrap();

        gateway(backend.clone())
            .draft_area_narrative(area, catalog.in_area(area.code), &EvidenceCollection::new())
            .await;

        let prompt = backend.last_prompt().unwrap();
        for sub in catalog.in_area(CompetencyAreaCode::D) {
            assert!(prompt.contains(&markup::more_info_placeholder(sub)));
        }
    }
}
