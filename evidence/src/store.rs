//! Evidence Store - single owner of the evidence collection
//!
//! Every mutation builds the next collection, persists it under
//! `userEvidence`, and only then swaps it in, bumps the version and
//! publishes an [`EvidenceEvent`]. A failed write leaves the store unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use competency::{EvidenceCollection, EvidenceItem, RagStatus, Upsert};

use crate::error::EvidenceError;
use crate::storage::{self, KeyValueStore, StorageKey};

const EVENT_CAPACITY: usize = 256;

/// Whether an assessed item may go back to `NotAssessed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Once assessed, an item stays assessed
    #[default]
    Monotonic,
    /// Items may be reset for re-assessment
    AllowReset,
}

impl StatusPolicy {
    fn check(&self, item: &EvidenceItem, next: RagStatus) -> Result<(), EvidenceError> {
        if *self == Self::Monotonic && item.rag_status.is_assessed() && !next.is_assessed() {
            return Err(EvidenceError::StatusRegression {
                item_id: item.id.clone(),
                current: item.rag_status,
            });
        }
        Ok(())
    }
}

/// Published after every committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidenceEvent {
    Added {
        item_id: String,
        code: String,
        replaced: bool,
        version: u64,
    },
    Assessed {
        item_id: String,
        code: String,
        rag_status: RagStatus,
        version: u64,
    },
    Removed {
        item_id: String,
        code: String,
        version: u64,
    },
    Cleared {
        version: u64,
    },
}

impl EvidenceEvent {
    pub fn version(&self) -> u64 {
        match self {
            Self::Added { version, .. }
            | Self::Assessed { version, .. }
            | Self::Removed { version, .. }
            | Self::Cleared { version } => *version,
        }
    }
}

/// Result of an assessment update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The item as stored after the update
    Updated(EvidenceItem),
    /// No item with that id under that code; nothing changed
    NotFound,
}

/// Owns the evidence collection and its persistence.
pub struct EvidenceStore {
    collection: RwLock<EvidenceCollection>,
    storage: Arc<dyn KeyValueStore>,
    policy: StatusPolicy,
    version: AtomicU64,
    events: broadcast::Sender<EvidenceEvent>,
}

impl EvidenceStore {
    /// Create an empty store without reading persisted state.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_collection(storage, EvidenceCollection::new())
    }

    /// Create a store holding the given collection.
    pub fn with_collection(storage: Arc<dyn KeyValueStore>, collection: EvidenceCollection) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            collection: RwLock::new(collection),
            storage,
            policy: StatusPolicy::default(),
            version: AtomicU64::new(0),
            events,
        }
    }

    /// Open a store from the persisted collection, if any.
    pub async fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, EvidenceError> {
        let collection: EvidenceCollection =
            storage::load(storage.as_ref(), StorageKey::UserEvidence)
                .await?
                .unwrap_or_default();

        info!(items = collection.len(), "Loaded evidence collection");
        Ok(Self::with_collection(storage, collection))
    }

    /// Set the status policy.
    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Change counter, incremented on every committed mutation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Receive an event for every committed mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<EvidenceEvent> {
        self.events.subscribe()
    }

    /// Append an item, or replace the item with the same id in place.
    ///
    /// Ids are unique across the collection: an id already filed under another
    /// code is rejected rather than moved.
    pub async fn add_evidence(&self, item: EvidenceItem) -> Result<Upsert, EvidenceError> {
        let mut guard = self.collection.write().await;

        if let Some(held_by) = guard.code_of(&item.id) {
            if held_by != item.sub_competency_code {
                return Err(EvidenceError::IdConflict {
                    item_id: item.id,
                    code: held_by.to_string(),
                });
            }
        }
        if let Some(existing) = guard.find(&item.sub_competency_code, &item.id) {
            self.policy.check(existing, item.rag_status)?;
        }

        let mut next = guard.clone();
        let item_id = item.id.clone();
        let code = item.sub_competency_code.clone();
        let result = next.upsert(item);

        self.persist(&next).await?;
        *guard = next;

        let version = self.bump();
        let replaced = matches!(result, Upsert::Replaced(_));
        info!(item_id = %item_id, code = %code, replaced, version, "Evidence stored");
        self.publish(EvidenceEvent::Added {
            item_id,
            code,
            replaced,
            version,
        });

        Ok(result)
    }

    /// Record an assessment. Unknown ids are a no-op returning `NotFound`.
    pub async fn update_assessment(
        &self,
        item_id: &str,
        code: &str,
        rag_status: RagStatus,
        feedback: Option<String>,
    ) -> Result<UpdateOutcome, EvidenceError> {
        let mut guard = self.collection.write().await;

        match guard.find(code, item_id) {
            Some(existing) => self.policy.check(existing, rag_status)?,
            None => {
                warn!(item_id = %item_id, code = %code, "Assessment for unknown evidence ignored");
                return Ok(UpdateOutcome::NotFound);
            }
        }

        let mut next = guard.clone();
        let updated = match next.find_mut(code, item_id) {
            Some(item) => {
                item.apply_assessment(rag_status, feedback, Utc::now());
                item.clone()
            }
            None => return Ok(UpdateOutcome::NotFound),
        };

        self.persist(&next).await?;
        *guard = next;

        let version = self.bump();
        info!(item_id = %item_id, code = %code, rag_status = %rag_status, version, "Assessment recorded");
        self.publish(EvidenceEvent::Assessed {
            item_id: item_id.to_string(),
            code: code.to_string(),
            rag_status,
            version,
        });

        Ok(UpdateOutcome::Updated(updated))
    }

    /// Mark an item for re-assessment. Only permitted under [`StatusPolicy::AllowReset`].
    pub async fn reset_assessment(
        &self,
        item_id: &str,
        code: &str,
    ) -> Result<UpdateOutcome, EvidenceError> {
        self.update_assessment(item_id, code, RagStatus::NotAssessed, None)
            .await
    }

    /// Remove an item. The code's key disappears with its last item.
    pub async fn remove_evidence(
        &self,
        item_id: &str,
        code: &str,
    ) -> Result<Option<EvidenceItem>, EvidenceError> {
        let mut guard = self.collection.write().await;
        if guard.find(code, item_id).is_none() {
            debug!(item_id = %item_id, code = %code, "Nothing to remove");
            return Ok(None);
        }

        let mut next = guard.clone();
        let removed = next.remove(code, item_id);

        self.persist(&next).await?;
        *guard = next;

        let version = self.bump();
        info!(item_id = %item_id, code = %code, version, "Evidence removed");
        self.publish(EvidenceEvent::Removed {
            item_id: item_id.to_string(),
            code: code.to_string(),
            version,
        });

        Ok(removed)
    }

    /// Replace everything with an empty collection.
    pub async fn clear(&self) -> Result<(), EvidenceError> {
        let mut guard = self.collection.write().await;
        let next = EvidenceCollection::new();

        self.persist(&next).await?;
        *guard = next;

        let version = self.bump();
        info!(version, "Evidence cleared");
        self.publish(EvidenceEvent::Cleared { version });
        Ok(())
    }

    /// Items for a sub-competency in submission order; empty when none.
    pub async fn get_evidence_for(&self, code: &str) -> Vec<EvidenceItem> {
        self.collection.read().await.items_for(code).to_vec()
    }

    /// Look up one item.
    pub async fn get(&self, code: &str, item_id: &str) -> Option<EvidenceItem> {
        self.collection.read().await.find(code, item_id).cloned()
    }

    /// Copy of the whole collection.
    pub async fn snapshot(&self) -> EvidenceCollection {
        self.collection.read().await.clone()
    }

    async fn persist(&self, collection: &EvidenceCollection) -> Result<(), EvidenceError> {
        storage::save(self.storage.as_ref(), StorageKey::UserEvidence, collection).await?;
        Ok(())
    }

    fn bump(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, event: EvidenceEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
