//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::*;

/// Computes a reply from the request.
pub type MockResponder = Arc<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

enum Scripted {
    Reply(String),
    Failure(String),
}

/// Mock backend for testing.
///
/// Replies come from, in order: the scripted queue, the responder, then the
/// fixed default content. Every prompt is recorded.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    response_content: String,
    scripted: Mutex<VecDeque<Scripted>>,
    responder: Option<MockResponder>,
    prompts: Mutex<Vec<String>>,
    call_count: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            response_content: "Mock response".to_string(),
            scripted: Mutex::new(VecDeque::new()),
            responder: None,
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the default response content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Compute replies from each request.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Set availability. An unavailable mock fails every completion.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Queue a reply for the next unanswered call.
    pub fn push_response(&self, content: impl Into<String>) {
        self.queue(Scripted::Reply(content.into()));
    }

    /// Queue a network failure for the next unanswered call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.queue(Scripted::Failure(message.into()));
    }

    fn queue(&self, entry: Scripted) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(entry);
        }
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// The most recent prompt.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let prompt = request.prompt_text();
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        let scripted = self.scripted.lock().ok().and_then(|mut q| q.pop_front());
        let content = match scripted {
            Some(Scripted::Reply(content)) => content,
            Some(Scripted::Failure(message)) => return Err(LlmError::NetworkError(message)),
            None => match &self.responder {
                Some(responder) => responder(&request)?,
                None => self.response_content.clone(),
            },
        };

        // Estimate token counts
        let prompt_tokens = prompt.len() as u32 / 4;
        let completion_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend() {
        let backend = MockBackend::new("test-model").with_response("Hello, world!");

        assert!(backend.is_available().await);
        assert_eq!(backend.call_count(), 0);

        let response = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello, world!");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.last_prompt().as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let backend = MockBackend::new("test-model").with_available(false);

        assert!(!backend.is_available().await);

        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(result, Err(LlmError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_scripted_before_responder() {
        let backend = MockBackend::default().with_responder(|request| {
            Ok(format!("echo: {}", request.prompt_text()))
        });
        backend.push_response("first");
        backend.push_failure("connection reset");

        let first = backend.complete(CompletionRequest::user("a")).await.unwrap();
        assert_eq!(first.content, "first");

        let second = backend.complete(CompletionRequest::user("b")).await;
        assert!(matches!(second, Err(LlmError::NetworkError(_))));

        let third = backend.complete(CompletionRequest::user("c")).await.unwrap();
        assert_eq!(third.content, "echo: c");
        assert_eq!(backend.prompts(), vec!["a", "b", "c"]);
    }
}
