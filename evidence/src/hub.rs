//! File evidence hub
//!
//! A lighter evidence path: uploaded files are kept whole as base64 data URLs
//! and tagged against five fixed hub competencies. No AI assessment is
//! involved; a competency's status comes only from whether files are tagged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::storage::{self, KeyValueStore, StorageError, StorageKey};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Largest accepted upload.
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Accepted MIME types and the extensions shown for them.
pub const ALLOWED_FILE_TYPES: [(&str, &str); 5] = [
    ("image/jpeg", ".jpg, .jpeg"),
    ("image/png", ".png"),
    ("application/pdf", ".pdf"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
];

/// Errors from the file hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Invalid file type for \"{file_name}\" ({mime_type}). Allowed: {allowed}")]
    UnsupportedType {
        file_name: String,
        mime_type: String,
        allowed: String,
    },

    #[error("File \"{file_name}\" is {size} bytes; the limit is {max} bytes")]
    TooLarge { file_name: String, size: u64, max: u64 },

    #[error("Unknown hub competency: {0}")]
    UnknownCompetency(String),

    #[error("Hub file not found: {0}")]
    FileNotFound(String),

    #[error("Malformed data URL for file {0}")]
    MalformedData(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One of the fixed hub competencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct HubCompetency {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Shows Amber rather than Red while no file is tagged
    pub is_amber_by_default: bool,
}

impl HubCompetency {
    fn new(id: &str, title: &str, description: &str, is_amber_by_default: bool) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            is_amber_by_default,
        }
    }
}

/// The five hub competencies, in display order.
pub fn hub_competencies() -> Vec<HubCompetency> {
    vec![
        HubCompetency::new(
            "poc-1",
            "Technical Responsibility",
            "Evidence of taking technical responsibility for complex engineering tasks.",
            false,
        ),
        HubCompetency::new(
            "poc-2",
            "Project Management",
            "Evidence of planning, budgeting, and managing projects.",
            true,
        ),
        HubCompetency::new(
            "poc-3",
            "Stakeholder Communication",
            "Evidence of effective communication with technical and non-technical stakeholders.",
            false,
        ),
        HubCompetency::new(
            "poc-4",
            "Ethical Conduct",
            "Evidence of applying ethical principles in engineering practice.",
            false,
        ),
        HubCompetency::new(
            "poc-5",
            "Continuing Professional Development (CPD)",
            "Record of activities undertaken to maintain and enhance competence.",
            true,
        ),
    ]
}

/// Traffic light for a hub competency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum HubStatus {
    Red,
    Amber,
    Green,
}

/// A stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct HubFile {
    pub id: String,
    pub file_name: String,
    /// MIME type
    pub file_type: String,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
    pub associated_competency_ids: Vec<String>,
    pub file_data_url: String,
}

impl HubFile {
    /// Decode the stored bytes.
    pub fn decode(&self) -> Result<Vec<u8>, HubError> {
        let (_, payload) = self
            .file_data_url
            .split_once(";base64,")
            .ok_or_else(|| HubError::MalformedData(self.id.clone()))?;
        STANDARD
            .decode(payload)
            .map_err(|_| HubError::MalformedData(self.id.clone()))
    }
}

/// A file to add to the hub.
#[derive(Debug, Clone)]
pub struct HubUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub competency_ids: Vec<String>,
}

/// Persisted form under `pocUserEvidence`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredHub {
    #[serde(default)]
    files: Vec<HubFile>,
}

/// Row of the hub status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubCompetencyStatus {
    pub competency: HubCompetency,
    pub status: HubStatus,
    pub file_count: usize,
}

/// Owns the hub files and their persistence.
pub struct FileEvidenceHub {
    competencies: Vec<HubCompetency>,
    files: RwLock<Vec<HubFile>>,
    storage: Arc<dyn KeyValueStore>,
    version: AtomicU64,
}

impl FileEvidenceHub {
    /// Create an empty hub without reading persisted state.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_files(storage, Vec::new())
    }

    fn with_files(storage: Arc<dyn KeyValueStore>, files: Vec<HubFile>) -> Self {
        Self {
            competencies: hub_competencies(),
            files: RwLock::new(files),
            storage,
            version: AtomicU64::new(0),
        }
    }

    /// Open the hub from persisted state, if any.
    pub async fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, HubError> {
        let stored: StoredHub = storage::load(storage.as_ref(), StorageKey::FileEvidence)
            .await?
            .unwrap_or_default();

        info!(files = stored.files.len(), "Loaded file hub");
        Ok(Self::with_files(storage, stored.files))
    }

    pub fn competencies(&self) -> &[HubCompetency] {
        &self.competencies
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Validate and store a new file.
    pub async fn add_file(&self, upload: HubUpload) -> Result<HubFile, HubError> {
        if !ALLOWED_FILE_TYPES.iter().any(|(mime, _)| *mime == upload.mime_type) {
            return Err(HubError::UnsupportedType {
                file_name: upload.file_name,
                mime_type: upload.mime_type,
                allowed: allowed_extensions(),
            });
        }

        let size = upload.bytes.len() as u64;
        if size > MAX_FILE_SIZE_BYTES {
            return Err(HubError::TooLarge {
                file_name: upload.file_name,
                size,
                max: MAX_FILE_SIZE_BYTES,
            });
        }
        self.check_competencies(&upload.competency_ids)?;

        let file = HubFile {
            id: format!("poc-file-{}", uuid::Uuid::new_v4()),
            file_data_url: format!(
                "data:{};base64,{}",
                upload.mime_type,
                STANDARD.encode(&upload.bytes)
            ),
            file_name: upload.file_name,
            file_type: upload.mime_type,
            file_size: size,
            upload_date: Utc::now(),
            associated_competency_ids: upload.competency_ids,
        };

        let mut guard = self.files.write().await;
        let mut next = guard.clone();
        next.push(file.clone());
        self.persist(&next).await?;
        *guard = next;
        self.version.fetch_add(1, Ordering::SeqCst);

        info!(file_id = %file.id, file = %file.file_name, size, "Hub file added");
        Ok(file)
    }

    /// Delete a file, returning it if it existed.
    pub async fn delete_file(&self, file_id: &str) -> Result<Option<HubFile>, HubError> {
        let mut guard = self.files.write().await;
        let Some(index) = guard.iter().position(|f| f.id == file_id) else {
            return Ok(None);
        };

        let mut next = guard.clone();
        let removed = next.remove(index);
        self.persist(&next).await?;
        *guard = next;
        self.version.fetch_add(1, Ordering::SeqCst);

        info!(file_id = %file_id, "Hub file deleted");
        Ok(Some(removed))
    }

    pub async fn get_file(&self, file_id: &str) -> Option<HubFile> {
        self.files
            .read()
            .await
            .iter()
            .find(|f| f.id == file_id)
            .cloned()
    }

    /// Replace a file's competency tags. Refreshes its upload date.
    pub async fn update_associations(
        &self,
        file_id: &str,
        competency_ids: Vec<String>,
    ) -> Result<HubFile, HubError> {
        self.check_competencies(&competency_ids)?;

        let mut guard = self.files.write().await;
        let mut next = guard.clone();
        let file = next
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| HubError::FileNotFound(file_id.to_string()))?;
        file.associated_competency_ids = competency_ids;
        file.upload_date = Utc::now();
        let updated = file.clone();

        self.persist(&next).await?;
        *guard = next;
        self.version.fetch_add(1, Ordering::SeqCst);

        info!(file_id = %file_id, tags = updated.associated_competency_ids.len(), "Hub associations updated");
        Ok(updated)
    }

    /// All files in upload order.
    pub async fn list_files(&self) -> Vec<HubFile> {
        self.files.read().await.clone()
    }

    /// Files tagged with a competency.
    pub async fn files_for(&self, competency_id: &str) -> Vec<HubFile> {
        self.files
            .read()
            .await
            .iter()
            .filter(|f| f.associated_competency_ids.iter().any(|id| id == competency_id))
            .cloned()
            .collect()
    }

    /// Status of every hub competency, in display order.
    pub async fn status_table(&self) -> Vec<HubCompetencyStatus> {
        let files = self.files.read().await;
        self.competencies
            .iter()
            .map(|competency| {
                let file_count = files
                    .iter()
                    .filter(|f| f.associated_competency_ids.contains(&competency.id))
                    .count();
                HubCompetencyStatus {
                    status: hub_status(competency, file_count),
                    competency: competency.clone(),
                    file_count,
                }
            })
            .collect()
    }

    /// Remove every file.
    pub async fn clear(&self) -> Result<(), HubError> {
        let mut guard = self.files.write().await;
        self.persist(&[]).await?;
        guard.clear();
        self.version.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_competencies(&self, ids: &[String]) -> Result<(), HubError> {
        match ids
            .iter()
            .find(|id| !self.competencies.iter().any(|c| &c.id == *id))
        {
            Some(unknown) => Err(HubError::UnknownCompetency(unknown.clone())),
            None => Ok(()),
        }
    }

    async fn persist(&self, files: &[HubFile]) -> Result<(), HubError> {
        #[derive(Serialize)]
        struct StoredHubRef<'a> {
            files: &'a [HubFile],
        }
        storage::save(
            self.storage.as_ref(),
            StorageKey::FileEvidence,
            &StoredHubRef { files },
        )
        .await?;
        Ok(())
    }
}

/// Green with any tagged file, otherwise Amber or Red by default.
pub fn hub_status(competency: &HubCompetency, file_count: usize) -> HubStatus {
    if file_count > 0 {
        HubStatus::Green
    } else if competency.is_amber_by_default {
        HubStatus::Amber
    } else {
        HubStatus::Red
    }
}

fn allowed_extensions() -> String {
    ALLOWED_FILE_TYPES
        .iter()
        .map(|(_, ext)| *ext)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn upload(mime: &str, size: usize, tags: &[&str]) -> HubUpload {
        HubUpload {
            file_name: "evidence.pdf".to_string(),
            mime_type: mime.to_string(),
            bytes: vec![7u8; size],
            competency_ids: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_default_statuses() {
        let hub = FileEvidenceHub::new(Arc::new(MemoryStore::new()));
        let statuses: Vec<_> = hub.status_table().await.iter().map(|row| row.status).collect();

        assert_eq!(
            statuses,
            vec![
                HubStatus::Red,
                HubStatus::Amber,
                HubStatus::Red,
                HubStatus::Red,
                HubStatus::Amber
            ]
        );
    }

    #[tokio::test]
    async fn test_add_and_tag() {
        let hub = FileEvidenceHub::new(Arc::new(MemoryStore::new()));
        let file = hub
            .add_file(upload("application/pdf", 16, &["poc-1"]))
            .await
            .unwrap();

        assert!(file.id.starts_with("poc-file-"));
        assert!(file.file_data_url.starts_with("data:application/pdf;base64,"));
        assert_eq!(file.decode().unwrap(), vec![7u8; 16]);
        assert_eq!(hub.status_table().await[0].status, HubStatus::Green);

        let updated = hub
            .update_associations(&file.id, vec!["poc-4".to_string()])
            .await
            .unwrap();
        assert!(updated.upload_date >= file.upload_date);

        let table = hub.status_table().await;
        assert_eq!(table[0].status, HubStatus::Red);
        assert_eq!(table[3].status, HubStatus::Green);
        assert_eq!(hub.files_for("poc-4").await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_type_size_and_unknown_tag() {
        let hub = FileEvidenceHub::new(Arc::new(MemoryStore::new()));

        let err = hub.add_file(upload("text/plain", 4, &[])).await.unwrap_err();
        assert!(matches!(err, HubError::UnsupportedType { .. }));

        let err = hub
            .add_file(upload("image/png", MAX_FILE_SIZE_BYTES as usize + 1, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::TooLarge { .. }));

        let err = hub
            .add_file(upload("image/png", 4, &["poc-9"]))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::UnknownCompetency(id) if id == "poc-9"));

        assert!(hub.list_files().await.is_empty());
        assert_eq!(hub.version(), 0);
    }

    #[tokio::test]
    async fn test_persisted_shape_and_reopen() {
        let backing = Arc::new(MemoryStore::new());
        let hub = FileEvidenceHub::new(backing.clone());
        let file = hub
            .add_file(upload("image/jpeg", 8, &["poc-2", "poc-5"]))
            .await
            .unwrap();

        let raw = backing.get(StorageKey::FileEvidence).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["files"][0]["fileType"], "image/jpeg");
        assert_eq!(json["files"][0]["associatedCompetencyIds"][1], "poc-5");

        let reopened = FileEvidenceHub::open(backing).await.unwrap();
        assert_eq!(reopened.get_file(&file.id).await, Some(file.clone()));

        assert!(reopened.delete_file(&file.id).await.unwrap().is_some());
        assert!(reopened.delete_file(&file.id).await.unwrap().is_none());
        assert!(reopened.list_files().await.is_empty());
    }
}
