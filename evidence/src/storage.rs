//! Key-value persistence
//!
//! Each logical key holds one serialized JSON document that is overwritten
//! wholesale on every write. Two backends: an in-memory map for tests and
//! embedding, and a directory of JSON files for the CLI.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error for key {key}: {source}")]
    Json {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// The logical keys the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Signed-in user
    CurrentUser,
    /// Career summary and target
    UserProfile,
    /// Evidence collection keyed by sub-competency
    UserEvidence,
    /// File hub contents
    FileEvidence,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        Self::CurrentUser,
        Self::UserProfile,
        Self::UserEvidence,
        Self::FileEvidence,
    ];

    /// Name under which the document is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentUser => "currentUser",
            Self::UserProfile => "userProfile",
            Self::UserEvidence => "userEvidence",
            Self::FileEvidence => "pocUserEvidence",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-document key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw document for a key, if any.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Replace the document for a key.
    async fn put(&self, key: StorageKey, value: String) -> Result<(), StorageError>;

    /// Delete a key. Removing an absent key succeeds.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// Read and deserialize a document.
pub async fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: StorageKey,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Json { key, source }),
        None => Ok(None),
    }
}

/// Serialize and write a document.
pub async fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: StorageKey,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Json { key, source })?;
    store.put(key, raw).await
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<StorageKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        self.entries.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.entries.remove(&key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a root directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Open a store at the given directory, creating it if needed.
    pub async fn open<P: AsRef<Path>>(root_dir: P) -> Result<Self, StorageError> {
        let root_dir = root_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root_dir).await?;

        info!(path = %root_dir.display(), "Opened file store");

        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn key_path(&self, key: StorageKey) -> PathBuf {
        self.root_dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;

        debug!(key = %key, bytes = value.len(), "Wrote document");
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_names() {
        let names: Vec<_> = StorageKey::ALL.iter().map(StorageKey::as_str).collect();
        assert_eq!(
            names,
            ["currentUser", "userProfile", "userEvidence", "pocUserEvidence"]
        );
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();

        assert!(store.get(StorageKey::UserProfile).await.unwrap().is_none());
        save(&store, StorageKey::UserProfile, &vec![1, 2, 3]).await.unwrap();

        let loaded: Option<Vec<i32>> = load(&store, StorageKey::UserProfile).await.unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        store.remove(StorageKey::UserProfile).await.unwrap();
        store.remove(StorageKey::UserProfile).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).await.unwrap();
            store
                .put(StorageKey::UserEvidence, "{\"A1\":[]}".to_string())
                .await
                .unwrap();
        }

        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(dir.path().join("userEvidence.json").exists());
        assert!(!dir.path().join("userEvidence.json.tmp").exists());
        assert_eq!(
            store.get(StorageKey::UserEvidence).await.unwrap().as_deref(),
            Some("{\"A1\":[]}")
        );

        store.remove(StorageKey::UserEvidence).await.unwrap();
        assert!(store.get(StorageKey::UserEvidence).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_names_key() {
        let store = MemoryStore::new();
        store
            .put(StorageKey::CurrentUser, "not json".to_string())
            .await
            .unwrap();

        let result: Result<Option<Vec<i32>>, _> = load(&store, StorageKey::CurrentUser).await;
        match result {
            Err(StorageError::Json { key, .. }) => assert_eq!(key, StorageKey::CurrentUser),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
