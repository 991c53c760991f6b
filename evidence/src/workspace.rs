//! CharterWorkspace - the object graph built once at startup.
//!
//! Owns the catalog, evidence store, file hub, gateway and session, and wires
//! the submission flow: validate, store as NotAssessed, assess, record.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use charter_agent::prompt::is_draftable;
use charter_agent::{
    ApplicationDraft, AssessmentGateway, AssessmentOutcome, DraftOutcome, GatewayConfig,
    LlmBackend,
};
use competency::{
    CompetencyAreaCode, CompetencyCatalog, EvidenceCollection, EvidenceItem, SubCompetency,
};

use crate::aggregation::{
    compute_area_progress, compute_readiness, AreaProgressSnapshot, DashboardSummary,
    ReadinessSnapshot,
};
use crate::error::EvidenceError;
use crate::extraction;
use crate::hub::FileEvidenceHub;
use crate::session::{ProfileData, UserAccount};
use crate::storage::{self, KeyValueStore, StorageKey};
use crate::store::{EvidenceStore, StatusPolicy, UpdateOutcome};

/// Construction settings.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    pub catalog: CompetencyCatalog,
    pub policy: StatusPolicy,
    pub gateway: GatewayConfig,
}

/// Result of submitting evidence.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The item as stored after assessment
    pub item: EvidenceItem,
    pub outcome: AssessmentOutcome,
}

#[derive(Debug, Default)]
struct Session {
    user: Option<UserAccount>,
    profile: ProfileData,
}

/// Root of the application state.
pub struct CharterWorkspace {
    catalog: CompetencyCatalog,
    storage: Arc<dyn KeyValueStore>,
    evidence: EvidenceStore,
    hub: FileEvidenceHub,
    gateway: AssessmentGateway,
    session: RwLock<Session>,
}

impl CharterWorkspace {
    /// Open with default options.
    pub async fn open(
        storage: Arc<dyn KeyValueStore>,
        backend: Arc<dyn LlmBackend>,
    ) -> Result<Self, EvidenceError> {
        Self::open_with(storage, backend, WorkspaceOptions::default()).await
    }

    /// Open, restoring persisted state only when a user is stored.
    pub async fn open_with(
        storage: Arc<dyn KeyValueStore>,
        backend: Arc<dyn LlmBackend>,
        options: WorkspaceOptions,
    ) -> Result<Self, EvidenceError> {
        let user: Option<UserAccount> =
            storage::load(storage.as_ref(), StorageKey::CurrentUser).await?;

        let (session, evidence, hub) = match user {
            Some(user) => {
                let profile = storage::load(storage.as_ref(), StorageKey::UserProfile)
                    .await?
                    .unwrap_or_default();
                info!(user = %user.email, "Restoring session");
                (
                    Session {
                        user: Some(user),
                        profile,
                    },
                    EvidenceStore::open(storage.clone()).await?,
                    FileEvidenceHub::open(storage.clone()).await?,
                )
            }
            None => (
                Session::default(),
                EvidenceStore::new(storage.clone()),
                FileEvidenceHub::new(storage.clone()),
            ),
        };

        let gateway = AssessmentGateway::new(backend).with_config(options.gateway);
        debug!(backend = %gateway.backend_id(), policy = ?options.policy, "Workspace ready");

        Ok(Self {
            catalog: options.catalog,
            storage,
            evidence: evidence.with_policy(options.policy),
            hub,
            gateway,
            session: RwLock::new(session),
        })
    }

    pub fn catalog(&self) -> &CompetencyCatalog {
        &self.catalog
    }

    pub fn evidence(&self) -> &EvidenceStore {
        &self.evidence
    }

    pub fn hub(&self) -> &FileEvidenceHub {
        &self.hub
    }

    pub fn gateway(&self) -> &AssessmentGateway {
        &self.gateway
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn current_user(&self) -> Option<UserAccount> {
        self.session.read().await.user.clone()
    }

    /// Sign in with a mock account, starting from empty profile and evidence.
    pub async fn login(&self, email: &str) -> Result<UserAccount, EvidenceError> {
        if email.trim().is_empty() {
            return Err(EvidenceError::Validation("Email cannot be empty.".to_string()));
        }

        let user = UserAccount::mock(email);
        let profile = ProfileData::default();

        // The stored user marks a session as restorable, so it is written last.
        self.evidence.clear().await?;
        self.hub.clear().await?;
        storage::save(self.storage.as_ref(), StorageKey::UserProfile, &profile).await?;
        storage::save(self.storage.as_ref(), StorageKey::CurrentUser, &user).await?;

        let mut session = self.session.write().await;
        session.user = Some(user.clone());
        session.profile = profile;

        info!(user = %user.email, "Logged in");
        Ok(user)
    }

    /// Sign out and remove every persisted key.
    pub async fn logout(&self) -> Result<(), EvidenceError> {
        self.evidence.clear().await?;
        self.hub.clear().await?;
        for key in StorageKey::ALL {
            self.storage.remove(key).await?;
        }

        *self.session.write().await = Session::default();
        info!("Logged out");
        Ok(())
    }

    pub async fn profile(&self) -> ProfileData {
        self.session.read().await.profile.clone()
    }

    /// Replace the profile wholesale.
    pub async fn update_profile(&self, profile: ProfileData) -> Result<(), EvidenceError> {
        let mut session = self.session.write().await;
        if session.user.is_none() {
            return Err(EvidenceError::NotSignedIn);
        }

        storage::save(self.storage.as_ref(), StorageKey::UserProfile, &profile).await?;
        session.profile = profile;
        Ok(())
    }

    // =========================================================================
    // Evidence submission
    // =========================================================================

    /// Submit narrative evidence and assess it.
    pub async fn submit_text_evidence(
        &self,
        code: &str,
        text: &str,
    ) -> Result<Submission, EvidenceError> {
        let owner = self.signed_in_user().await?;
        let sub = self.sub_competency(code)?;
        if text.trim().is_empty() {
            return Err(EvidenceError::Validation(
                "Evidence content cannot be empty.".to_string(),
            ));
        }

        let item = EvidenceItem::text(code, owner.id, text);
        self.store_and_assess(item, sub).await
    }

    /// Extract an uploaded document's text, store it and assess it.
    pub async fn submit_file_evidence(
        &self,
        code: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Submission, EvidenceError> {
        let owner = self.signed_in_user().await?;
        let sub = self.sub_competency(code)?;
        if file_name.trim().is_empty() {
            return Err(EvidenceError::Validation(
                "Please select a file to upload.".to_string(),
            ));
        }

        let content = extraction::extract_text(file_name, bytes)?;
        let item = EvidenceItem::file(code, owner.id, content, file_name);
        self.store_and_assess(item, sub).await
    }

    async fn store_and_assess(
        &self,
        item: EvidenceItem,
        sub: &SubCompetency,
    ) -> Result<Submission, EvidenceError> {
        let item_id = item.id.clone();
        let content = item.content.clone();
        let file_name = item.original_file_name.clone();
        self.evidence.add_evidence(item.clone()).await?;

        let outcome = self
            .gateway
            .assess_evidence(&content, sub, file_name.as_deref())
            .await;
        let assessment = outcome.assessment().clone();

        let item = match self
            .evidence
            .update_assessment(
                &item_id,
                &sub.code,
                assessment.rag_status,
                Some(assessment.feedback),
            )
            .await?
        {
            UpdateOutcome::Updated(item) => item,
            UpdateOutcome::NotFound => {
                warn!(item_id = %item_id, "Evidence removed before its assessment arrived");
                item
            }
        };

        Ok(Submission { item, outcome })
    }

    pub async fn evidence_for(&self, code: &str) -> Vec<EvidenceItem> {
        self.evidence.get_evidence_for(code).await
    }

    pub async fn remove_evidence(
        &self,
        code: &str,
        item_id: &str,
    ) -> Result<Option<EvidenceItem>, EvidenceError> {
        self.evidence.remove_evidence(item_id, code).await
    }

    pub async fn snapshot(&self) -> EvidenceCollection {
        self.evidence.snapshot().await
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    pub async fn area_progress(&self) -> Vec<AreaProgressSnapshot> {
        compute_area_progress(&self.catalog, &self.snapshot().await)
    }

    pub async fn readiness(&self) -> ReadinessSnapshot {
        compute_readiness(&self.catalog, &self.snapshot().await)
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::compute(&self.catalog, &self.snapshot().await)
    }

    // =========================================================================
    // Drafting
    // =========================================================================

    /// Draft one area's section from its Green and Amber evidence.
    pub async fn draft_section(&self, area: CompetencyAreaCode) -> DraftOutcome {
        let snapshot = self.snapshot().await;
        let subs: Vec<&SubCompetency> = self.catalog.in_area(area).collect();

        let items: Vec<EvidenceItem> = subs
            .iter()
            .flat_map(|sub| snapshot.items_for(&sub.code))
            .filter(|item| is_draftable(item.rag_status))
            .cloned()
            .collect();

        let title = self
            .catalog
            .area(area)
            .map(|a| a.title.clone())
            .unwrap_or_else(|| format!("Area {}", area));
        let representative = subs
            .first()
            .map(|sub| sub.code.clone())
            .unwrap_or_else(|| area.to_string());

        self.gateway
            .draft_section(&title, &representative, &items)
            .await
    }

    /// Draft one area's full narrative, marking uncovered sub-competencies.
    pub async fn draft_area(&self, area: CompetencyAreaCode) -> Option<DraftOutcome> {
        let details = self.catalog.area(area)?;
        let snapshot = self.snapshot().await;
        Some(
            self.gateway
                .draft_area_narrative(details, self.catalog.in_area(area), &snapshot)
                .await,
        )
    }

    /// Draft the whole application. Refused until the readiness rule holds.
    pub async fn draft_full_application(&self) -> Result<ApplicationDraft, EvidenceError> {
        let snapshot = self.snapshot().await;
        let readiness = compute_readiness(&self.catalog, &snapshot);

        if !readiness.is_ready_to_generate_full_application {
            warn!(
                uncovered = readiness.sub_competencies_with_no_evidence.len(),
                red_items = readiness.total_red_items,
                "Full application requested before ready"
            );
            return Err(EvidenceError::NotReady {
                uncovered: readiness.sub_competencies_with_no_evidence,
                red_items: readiness.total_red_items,
            });
        }

        Ok(self
            .gateway
            .draft_full_application(&self.catalog, &snapshot)
            .await)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn signed_in_user(&self) -> Result<UserAccount, EvidenceError> {
        self.current_user().await.ok_or(EvidenceError::NotSignedIn)
    }

    fn sub_competency(&self, code: &str) -> Result<&SubCompetency, EvidenceError> {
        self.catalog
            .get(code)
            .ok_or_else(|| EvidenceError::UnknownSubCompetency(code.to_string()))
    }
}
