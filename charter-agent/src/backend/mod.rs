//! LLM Backend abstraction layer.
//!
//! - Gemini `generateContent` (the production service)
//! - Mock backend for testing

pub mod gemini;
pub mod mock;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockResponder};
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
