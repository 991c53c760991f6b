//! Evidence store, readiness engine and workspace.
//!
//! - [`EvidenceStore`]: the persisted evidence collection, with change events
//! - [`aggregation`]: pure roll-ups of evidence into area progress and readiness
//! - [`extraction`]: text from uploaded documents
//! - [`FileEvidenceHub`]: files tagged against the hub competencies
//! - [`CharterWorkspace`]: the object graph wiring all of the above to the
//!   assessment gateway
//!
//! Persistence goes through [`KeyValueStore`], which holds one JSON document per
//! [`StorageKey`].

pub mod aggregation;
pub mod error;
pub mod extraction;
pub mod hub;
pub mod session;
pub mod storage;
pub mod store;
pub mod workspace;

pub use aggregation::{
    compute_area_progress, compute_readiness, count_items, rollup, suggest_next_steps,
    AreaProgressSnapshot, DashboardSummary, EvidenceCounts, ReadinessSnapshot, RollupBucket,
};
pub use error::EvidenceError;
pub use extraction::{DocumentKind, ExtractionError};
pub use hub::{FileEvidenceHub, HubCompetency, HubError, HubFile, HubStatus, HubUpload};
pub use session::{ProfileData, UserAccount};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageKey};
pub use store::{EvidenceEvent, EvidenceStore, StatusPolicy, UpdateOutcome};
pub use workspace::{CharterWorkspace, Submission, WorkspaceOptions};
