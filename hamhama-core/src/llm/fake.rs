//! Fake LLM provider for testing.
//!
//! Returns canned responses so the batch tools can be exercised without
//! network access or API costs. Responses come from a FIFO script first, then
//! from prompt-substring matches, then from the default.

use super::{GenerationRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

/// A fake LLM provider for testing.
#[derive(Debug)]
pub struct FakeProvider {
    /// Responses handed out in order, one per call, before anything else.
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    /// Default response if nothing else matches
    default_response: Option<String>,
    calls: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            default_response: Some("{}".to_string()),
            ..Self::new()
        }
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            responses: RwLock::new(HashMap::new()),
            default_response: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Queue a response for the next unscripted call.
    pub fn push_response(&self, response: &str) {
        self.push(Ok(response.to_string()));
    }

    /// Queue an error for the next unscripted call.
    pub fn push_error(&self, error: LlmError) {
        self.push(Err(error));
    }

    fn push(&self, outcome: Result<String, LlmError>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(outcome) = scripted {
            return outcome;
        }

        let prompt = &request.prompt;
        let responses = self.responses.read().unwrap_or_else(PoisonError::into_inner);

        // Find first matching pattern (case-insensitive)
        let prompt_lower = prompt.to_lowercase();
        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt)
    }

    #[tokio::test]
    async fn test_fake_provider_matching() {
        let provider = FakeProvider::with_response("hello", "world");
        let result = provider.complete(&request("Say hello to the user")).await.unwrap();
        assert_eq!(result, "world");
    }

    #[tokio::test]
    async fn test_fake_provider_case_insensitive() {
        let provider = FakeProvider::with_response("HELLO", "world");
        let result = provider.complete(&request("hello there")).await.unwrap();
        assert_eq!(result, "world");
    }

    #[tokio::test]
    async fn test_fake_provider_no_match() {
        let provider = FakeProvider::new();
        let result = provider.complete(&request("random prompt")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fake_provider_default_response() {
        let provider = FakeProvider::new().with_default_response("default");
        let result = provider.complete(&request("random prompt")).await.unwrap();
        assert_eq!(result, "default");
    }

    #[tokio::test]
    async fn test_script_takes_priority_and_drains() {
        let provider = FakeProvider::with_response("recipes", "matched");
        provider.push_error(LlmError::RequestFailed("timeout".to_string()));
        provider.push_response("scripted");

        let first = provider.complete(&request("recipes")).await;
        assert!(matches!(first, Err(LlmError::RequestFailed(_))));
        assert_eq!(provider.complete(&request("recipes")).await.unwrap(), "scripted");
        assert_eq!(provider.complete(&request("recipes")).await.unwrap(), "matched");
        assert_eq!(provider.calls(), 3);
    }
}
