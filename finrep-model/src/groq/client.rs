//! Groq client implementation.

use super::config::GroqConfig;
use super::convert::{self, ChatCompletionRequest, ChatCompletionResponse, ToolCallAccumulator};
use async_stream::try_stream;
use async_trait::async_trait;
use finrep_core::{
    Content, FinishReason, Llm, LlmRequest, LlmResponse, LlmResponseStream, Part, ReportError,
};
use finrep_telemetry::model_call_span;
use futures::StreamExt;
use reqwest::Client;

/// Groq client for chat completions with tool calling.
///
/// # Example
///
/// ```rust,ignore
/// use finrep_model::groq::{GroqClient, GroqConfig};
///
/// let client = GroqClient::new(GroqConfig::llama70b(api_key))?;
/// ```
pub struct GroqClient {
    client: Client,
    config: GroqConfig,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.effective_base_url())
            .finish()
    }
}

impl GroqClient {
    /// Create a new Groq client. Performs no network I/O.
    pub fn new(config: GroqConfig) -> Result<Self, ReportError> {
        if config.api_key.trim().is_empty() {
            return Err(ReportError::Config("Groq API key is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(ReportError::Config("Groq model id is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| ReportError::Model(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a client for llama-3.3-70b-versatile.
    pub fn llama70b(api_key: impl Into<String>) -> Result<Self, ReportError> {
        Self::new(GroqConfig::llama70b(api_key))
    }

    pub fn config(&self) -> &GroqConfig {
        &self.config
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.effective_base_url().trim_end_matches('/'))
    }

    fn build_request(&self, request: &LlmRequest, stream: bool) -> ChatCompletionRequest {
        let messages = convert::contents_to_messages(&request.contents);

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(convert::convert_tools(&request.tools))
        };

        let temperature =
            request.config.as_ref().and_then(|c| c.temperature).or(self.config.temperature);
        let top_p = request.config.as_ref().and_then(|c| c.top_p);
        let max_tokens = request
            .config
            .as_ref()
            .and_then(|c| c.max_output_tokens)
            .map(|t| t as u32)
            .or(self.config.max_tokens);

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
            top_p,
            max_tokens,
            stream: Some(stream),
            tools,
        }
    }
}

#[async_trait]
impl Llm for GroqClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(
        &self,
        request: LlmRequest,
        stream: bool,
    ) -> Result<LlmResponseStream, ReportError> {
        let api_url = self.api_url();
        let api_key = self.config.api_key.clone();
        let chat_request = self.build_request(&request, stream);
        let client = self.client.clone();

        model_call_span(&self.config.model).in_scope(|| {
            tracing::debug!(
                messages = chat_request.messages.len(),
                tools = chat_request.tools.as_ref().map_or(0, Vec::len),
                stream,
                "Sending Groq chat completion request"
            );
        });

        let response_stream = try_stream! {
            let response = send_checked(&client, &api_url, &api_key, &chat_request).await?;

            if stream {
                let mut byte_stream = response.bytes_stream();
                let mut lines = LineBuffer::default();
                let mut tool_calls = ToolCallAccumulator::default();

                while let Some(chunk_result) = byte_stream.next().await {
                    let chunk = chunk_result
                        .map_err(|e| ReportError::Model(format!("Stream read error: {}", e)))?;

                    lines.push(&chunk);

                    while let Some(line) = lines.next_line() {
                        if line.is_empty() || line == "data: [DONE]" {
                            continue;
                        }

                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };

                        let chunk_response = match serde_json::from_str::<ChatCompletionResponse>(data.trim()) {
                            Ok(parsed) => parsed,
                            Err(e) => {
                                tracing::warn!("Failed to parse Groq chunk: {} - {}", e, data);
                                continue;
                            }
                        };

                        let Some(choice) = chunk_response.choices.first() else {
                            continue;
                        };

                        let delta = choice.delta.clone().unwrap_or_default();
                        for tc in delta.tool_calls.iter().flatten() {
                            tool_calls.push(tc);
                        }

                        let text = delta.content.filter(|t| !t.is_empty());

                        if let Some(reason) = choice.finish_reason.as_deref() {
                            let mut parts = Vec::new();
                            if let Some(text) = text {
                                parts.push(Part::Text { text });
                            }
                            parts.extend(tool_calls.drain_parts());

                            yield LlmResponse {
                                content: if parts.is_empty() {
                                    None
                                } else {
                                    Some(Content { role: "model".to_string(), parts })
                                },
                                usage_metadata: chunk_response.usage_metadata(),
                                finish_reason: Some(FinishReason::from_openai(reason)),
                                partial: false,
                                turn_complete: true,
                            };
                        } else if let Some(text) = text {
                            yield LlmResponse {
                                content: Some(Content {
                                    role: "model".to_string(),
                                    parts: vec![Part::Text { text }],
                                }),
                                usage_metadata: None,
                                finish_reason: None,
                                partial: true,
                                turn_complete: false,
                            };
                        }
                    }
                }

                // Stream closed without a finish_reason; flush any pending calls.
                if !tool_calls.is_empty() {
                    yield LlmResponse {
                        content: Some(Content { role: "model".to_string(), parts: tool_calls.drain_parts() }),
                        usage_metadata: None,
                        finish_reason: Some(FinishReason::Other),
                        partial: false,
                        turn_complete: true,
                    };
                }
            } else {
                let response_text = response.text().await
                    .map_err(|e| ReportError::Model(format!("Failed to read response: {}", e)))?;

                let chat_response: ChatCompletionResponse = serde_json::from_str(&response_text)
                    .map_err(|e| ReportError::Model(format!(
                        "Failed to parse response: {} - {}",
                        e, response_text
                    )))?;

                yield convert::from_response(&chat_response);
            }
        };

        Ok(Box::pin(response_stream))
    }
}

async fn send_checked(
    client: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    chat_request: &ChatCompletionRequest,
) -> Result<reqwest::Response, ReportError> {
    let response = client
        .post(api_url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(chat_request)
        .send()
        .await
        .map_err(|e| ReportError::Model(format!("Groq API request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ReportError::Model(format!("Groq API error ({}): {}", status, error_text)));
    }

    Ok(response)
}

/// Accumulates raw stream bytes and hands out complete lines.
///
/// Decoding waits for the newline so a UTF-8 sequence split across reads stays intact.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}
