use crate::model::LlmResponse;
use crate::types::Content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event represents a single step of an agent run: a model turn, a partial chunk,
/// or a tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub invocation_id: String,
    pub author: String,
    #[serde(flatten)]
    pub llm_response: LlmResponse,
}

impl Event {
    pub fn new(invocation_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            invocation_id: invocation_id.into(),
            author: String::new(),
            llm_response: LlmResponse::default(),
        }
    }

    pub fn content(&self) -> Option<&Content> {
        self.llm_response.content.as_ref()
    }

    pub fn set_content(&mut self, content: Content) {
        self.llm_response.content = Some(content);
    }

    /// A complete model turn with text and no pending tool calls.
    pub fn is_final_response(&self) -> bool {
        !self.llm_response.partial
            && self.llm_response.turn_complete
            && self
                .content()
                .is_some_and(|c| c.role != "function" && !c.has_function_calls())
    }
}
