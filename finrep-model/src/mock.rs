use finrep_core::{Llm, LlmRequest, LlmResponse, LlmResponseStream, ReportError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted model for tests.
///
/// Responses added with [`MockLlm::with_response`] are replayed on every call. Turns added
/// with [`MockLlm::with_turn`] are consumed one per call, which lets a test script a tool
/// call followed by a final answer. Every request is recorded.
pub struct MockLlm {
    name: String,
    responses: Vec<LlmResponse>,
    turns: Mutex<VecDeque<Vec<LlmResponse>>>,
    error: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: vec![],
            turns: Mutex::new(VecDeque::new()),
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: LlmResponse) -> Self {
        self.responses.push(response);
        self
    }

    pub fn with_turn(self, responses: Vec<LlmResponse>) -> Self {
        if let Ok(mut turns) = self.turns.lock() {
            turns.push_back(responses);
        }
        self
    }

    /// Fail every call with a model error carrying `message`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, req: LlmRequest, _stream: bool) -> Result<LlmResponseStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req);
        }
        if let Some(message) = &self.error {
            return Err(ReportError::Model(message.clone()));
        }

        let responses = self
            .turns
            .lock()
            .ok()
            .and_then(|mut turns| turns.pop_front())
            .unwrap_or_else(|| self.responses.clone());

        let stream = async_stream::stream! {
            for response in responses {
                yield Ok(response);
            }
        };
        Ok(Box::pin(stream))
    }
}
