//! Charter Agent - generative-text gateway for competency evidence
//!
//! Provides:
//! - Trait-based LLM backends (Gemini REST, scripted mock)
//! - Prompt construction from catalog entries and stored evidence
//! - Defensive parsing of assessment replies into typed outcomes
//! - Area, section and full-application drafting with styled placeholders
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          AssessmentGateway              │
//! │  (assess, draft section/area/report)    │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┼───────────┐
//!      ▼           ▼           ▼
//! ┌──────────┐ ┌─────────┐ ┌──────────┐
//! │PromptBui-│ │LlmBack- │ │ parse /  │
//! │lder      │ │end      │ │ markup   │
//! └──────────┘ └─────────┘ └──────────┘
//! ```

pub mod backend;
pub mod config;
pub mod gateway;
pub mod markup;
pub mod parse;
pub mod prompt;
pub mod response;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{GeminiBackend, MockBackend};
pub use config::{BackendConfig, GatewayConfig};
pub use gateway::AssessmentGateway;
pub use markup::strip_markup;
pub use response::{
    ApplicationDraft, AreaDraft, Assessment, AssessmentOutcome, DraftOutcome,
    SERVICE_FAILURE_FEEDBACK,
};
