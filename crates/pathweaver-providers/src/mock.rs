//! Mock generator for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use pathweaver_core::traits::{GenerateRequest, GeneratedText, TextGenerator, TokenUsage};

/// What the mock does when asked to generate.
pub enum MockBehavior {
    /// Return the given text.
    Respond(String),
    /// Fail with the given error message.
    Fail(String),
    /// Sleep, to exercise ranker timeouts.
    Hang(Duration),
}

/// A mock text generator for testing the ranker without real API calls.
pub struct MockGenerator {
    behavior: MockBehavior,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockGenerator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A mock that always responds with the same text.
    pub fn with_text(text: &str) -> Self {
        Self::new(MockBehavior::Respond(text.to_string()))
    }

    /// A mock that always fails.
    pub fn failing(message: &str) -> Self {
        Self::new(MockBehavior::Fail(message.to_string()))
    }

    /// A mock that hangs longer than any sensible ranker timeout.
    pub fn hanging(duration: Duration) -> Self {
        Self::new(MockBehavior::Hang(duration))
    }

    /// Number of calls made to this generator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request made to this generator.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GeneratedText> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.behavior {
            MockBehavior::Respond(text) => Ok(GeneratedText {
                text: text.clone(),
                model: request.model.clone(),
                token_usage: TokenUsage {
                    prompt_tokens: (request.prompt.len() / 4) as u32,
                    completion_tokens: (text.len() / 4) as u32,
                    total_tokens: ((request.prompt.len() + text.len()) / 4) as u32,
                },
                latency_ms: 1,
            }),
            MockBehavior::Fail(message) => Err(anyhow::anyhow!("{message}")),
            MockBehavior::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(GeneratedText {
                    text: String::new(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: duration.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock-model".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn responds_with_fixed_text() {
        let generator = MockGenerator::with_text("[1, 2]");
        let response = generator.generate(&request("rank these")).await.unwrap();
        assert_eq!(response.text, "[1, 2]");
        assert_eq!(generator.call_count(), 1);
        assert_eq!(
            generator.last_request().unwrap().prompt,
            "rank these".to_string()
        );
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let generator = MockGenerator::failing("boom");
        let err = generator.generate(&request("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(generator.call_count(), 1);
    }
}
