/*!
 * Mock provider implementations for testing.
 *
 * The mock replays a script of replies, one per request:
 * - `MockProvider::scripted(..)` - Returns each scripted reply in turn
 * - `MockProvider::echo()` - Answers every batch with a well-formed translation
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Every request is recorded so tests can assert on call counts and payloads.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw text
    Text(String),
    /// Fail with an API error carrying this status code
    Error(u16),
}

/// Behavior once the script is empty
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Translate every subtitle of the payload with a prefix
    Echo,
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior once the script runs out
    behavior: MockBehavior,
    /// Replies consumed front to back
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Every request received
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified fallback behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that answers every request with a valid translation
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Replay the given replies, then fall back to echo
    pub fn scripted<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = MockReply>,
    {
        let provider = Self::echo();
        provider.script.lock().extend(replies);
        provider
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Build a well-formed reply translating each text as `[TRANSLATED] text`
    pub fn generate_batch_response(texts: &[&str]) -> String {
        let items: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                serde_json::json!({
                    "original": text,
                    "translated": format!("[TRANSLATED] {}", text),
                })
            })
            .collect();
        serde_json::json!({ "translated_subtitles": items }).to_string()
    }

    fn echo_reply(request: &CompletionRequest) -> String {
        let texts: Vec<String> = serde_json::from_str::<serde_json::Value>(&request.user_payload)
            .ok()
            .and_then(|payload| payload.get("subtitles").cloned())
            .and_then(|subs| serde_json::from_value(subs).ok())
            .unwrap_or_default();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        Self::generate_batch_response(&refs)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let scripted = self.script.lock().pop_front();
        let text = match scripted {
            Some(MockReply::Text(text)) => text,
            Some(MockReply::Error(status_code)) => {
                return Err(ProviderError::ApiError {
                    status_code,
                    message: format!("Simulated failure (request #{})", count + 1),
                });
            }
            None => match self.behavior {
                MockBehavior::Echo => Self::echo_reply(&request),
                MockBehavior::Failing => {
                    return Err(ProviderError::ApiError {
                        status_code: 500,
                        message: "Simulated provider failure".to_string(),
                    });
                }
                MockBehavior::Empty => String::new(),
            },
        };

        Ok(CompletionResponse {
            prompt_tokens: Some(request.user_payload.len() as u64),
            completion_tokens: Some(text.len() as u64),
            text,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("mock is failing".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
