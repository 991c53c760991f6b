//! CLI configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use charter_agent::{BackendConfig, GatewayConfig};
use evidence::StatusPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON document per persisted key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from(".charter") }

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// `monotonic` or `allow_reset`
    #[serde(default)]
    pub status_policy: StatusPolicy,
}

impl CliConfig {
    /// Load from a TOML file, or defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply command-line and environment overrides.
    pub fn apply_overrides(&mut self, data_dir: Option<String>, api_key: Option<String>) {
        if let Some(data_dir) = data_dir {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Some(api_key) = api_key.filter(|key| !key.is_empty()) {
            self.backend.api_key = Some(api_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CliConfig::load(&dir.path().join("charter.toml")).unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from(".charter"));
        assert_eq!(config.evidence.status_policy, StatusPolicy::Monotonic);
        assert_eq!(config.backend.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[storage]
data_dir = "/var/lib/charter"

[evidence]
status_policy = "allow_reset"

[gateway]
assessment_temperature = 0.2

[backend]
model = "gemini-2.5-pro"
"#
        )
        .unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/charter"));
        assert_eq!(config.evidence.status_policy, StatusPolicy::AllowReset);
        assert_eq!(config.gateway.assessment_temperature, 0.2);
        assert_eq!(config.gateway.area_temperature, 0.65);
        assert_eq!(config.backend.model, "gemini-2.5-pro");
        assert!(config.backend.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut config = CliConfig::default();
        config.apply_overrides(Some("/tmp/override".to_string()), Some(String::new()));
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/override"));
        assert!(config.backend.api_key.is_none());

        config.apply_overrides(None, Some("key-123".to_string()));
        assert_eq!(config.backend.api_key.as_deref(), Some("key-123"));
    }
}
