//! Error types for the evidence crate

use competency::RagStatus;

use crate::extraction::ExtractionError;
use crate::hub::HubError;
use crate::storage::StorageError;

/// Errors from the evidence store and workspace.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    /// Writing to or reading from the key-value store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The status policy forbids moving an assessed item back to NotAssessed
    #[error("Evidence {item_id} is already assessed as {current}; it cannot return to NotAssessed")]
    StatusRegression { item_id: String, current: RagStatus },

    /// The id is already filed under a different sub-competency
    #[error("Evidence {item_id} is already filed under {code}")]
    IdConflict { item_id: String, code: String },

    /// Submission rejected before any external call
    #[error("Invalid submission: {0}")]
    Validation(String),

    /// Evidence filed against a code the catalog does not contain
    #[error("Unknown sub-competency: {0}")]
    UnknownSubCompetency(String),

    /// Operation needs a signed-in user
    #[error("No user is signed in")]
    NotSignedIn,

    /// Full application requested before coverage is complete
    #[error("Not ready to generate the full application: {} uncovered sub-competencies, {red_items} Red items", uncovered.len())]
    NotReady {
        uncovered: Vec<String>,
        red_items: usize,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Hub(#[from] HubError),
}
