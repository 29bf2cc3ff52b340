//! Scripted provider for tests
//!
//! Replies are handed out in order, one per `complete()` call. Once the script
//! runs out the fallback reply is repeated. Every request is recorded so tests
//! can assert on the prompts that were sent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// One scripted outcome
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Successful completion with this content
    Text(String),
    /// Per-call API failure
    ApiError(String),
    /// Provider went away entirely
    Unavailable(String),
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    fn into_result(self) -> Result<LlmResponse> {
        match self {
            Self::Text(content) => Ok(LlmResponse {
                content,
                model: "mock-model".to_string(),
                usage: None,
            }),
            Self::ApiError(message) => Err(LlmError::ApiError {
                message,
                status_code: Some(500),
            }),
            Self::Unavailable(reason) => Err(LlmError::ProviderUnavailable(reason)),
        }
    }
}

pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    requests: Mutex<Vec<LlmRequest>>,
    call_count: AtomicUsize,
    unavailable: Option<String>,
    name: &'static str,
}

impl MockProvider {
    /// Replies in order, then per-call API errors
    pub fn scripted<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = MockReply>,
    {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            fallback: MockReply::ApiError("mock script exhausted".to_string()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            unavailable: None,
            name: "mock",
        }
    }

    /// Same content for every call
    pub fn always(content: &str) -> Self {
        Self::scripted(Vec::<MockReply>::new()).with_fallback(MockReply::text(content))
    }

    /// Provider that fails its availability check and every call
    pub fn unavailable(reason: &str) -> Self {
        let mut provider =
            Self::scripted(Vec::<MockReply>::new()).with_fallback(MockReply::Unavailable(reason.to_string()));
        provider.unavailable = Some(reason.to_string());
        provider
    }

    /// Reply used once the script is exhausted
    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.unwrap_or_else(|| self.fallback.clone()).into_result()
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> Result<()> {
        match &self.unavailable {
            Some(reason) => Err(LlmError::ProviderUnavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always() {
        let provider = MockProvider::always("What is Rust used for?");
        for _ in 0..3 {
            let response = provider.complete(LlmRequest::new("p")).await.unwrap();
            assert_eq!(response.content, "What is Rust used for?");
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_order_then_exhausted() {
        let provider = MockProvider::scripted([
            MockReply::text("first"),
            MockReply::ApiError("boom".to_string()),
            MockReply::text("third"),
        ]);

        assert_eq!(provider.complete(LlmRequest::new("a")).await.unwrap().content, "first");
        let err = provider.complete(LlmRequest::new("b")).await.unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(provider.complete(LlmRequest::new("c")).await.unwrap().content, "third");
        assert!(provider.complete(LlmRequest::new("d")).await.is_err());

        assert_eq!(provider.prompts(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let provider = MockProvider::unavailable("no GPU").with_name("offline");
        assert_eq!(provider.name(), "offline");
        assert!(provider.is_available().unwrap_err().is_fatal());
        assert!(provider.complete(LlmRequest::new("x")).await.unwrap_err().is_fatal());
    }
}
