//! Configuration types for the Groq provider.

use serde::{Deserialize, Serialize};

/// Default Groq API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Model used for research reports.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration for the Groq API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Groq API key.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Optional custom base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens for output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature applied when a request does not set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            base_url: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Default::default() }
    }

    /// Config for llama-3.3-70b-versatile.
    pub fn llama70b(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_GROQ_MODEL)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(GROQ_API_BASE)
    }
}
