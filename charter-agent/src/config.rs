//! Gateway and backend configuration.

use serde::{Deserialize, Serialize};

use crate::backend::gemini::{GeminiBackend, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::backend::LlmError;

/// Generation settings for each gateway operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Temperature for evidence assessment (kept low for stable ratings)
    #[serde(default = "default_assessment_temperature")]
    pub assessment_temperature: f32,

    /// Temperature for single-section drafts
    #[serde(default = "default_section_temperature")]
    pub section_temperature: f32,

    /// Temperature for whole-area drafts
    #[serde(default = "default_area_temperature")]
    pub area_temperature: f32,

    /// Word limit requested for assessment feedback
    #[serde(default = "default_feedback_words")]
    pub feedback_word_limit: u32,

    /// Optional cap on generated tokens
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            assessment_temperature: default_assessment_temperature(),
            section_temperature: default_section_temperature(),
            area_temperature: default_area_temperature(),
            feedback_word_limit: default_feedback_words(),
            max_output_tokens: None,
        }
    }
}

fn default_assessment_temperature() -> f32 { 0.3 }
fn default_section_temperature() -> f32 { 0.6 }
fn default_area_temperature() -> f32 { 0.65 }
fn default_feedback_words() -> u32 { 50 }

/// Connection settings for the Gemini backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// API key; usually supplied through the environment rather than the file
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }

impl BackendConfig {
    /// Build the configured backend.
    pub fn build(&self) -> Result<GeminiBackend, LlmError> {
        GeminiBackend::new(&self.base_url, &self.model, self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.assessment_temperature, 0.3);
        assert_eq!(config.area_temperature, 0.65);
        assert_eq!(config.feedback_word_limit, 50);

        let backend = BackendConfig::default();
        assert_eq!(backend.model, "gemini-2.5-flash");
        assert!(backend.api_key.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"assessment_temperature": 0.1}"#).unwrap();
        assert_eq!(config.assessment_temperature, 0.1);
        assert_eq!(config.section_temperature, 0.6);
    }
}
