//! Wire types and conversions for Groq's OpenAI-compatible chat completions API.

use finrep_core::{Content, FinishReason, LlmResponse, Part, UsageMetadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Groq chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments object.
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

/// Full response or one streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// Groq reports usage for streams under `x_groq.usage` on the last chunk.
    #[serde(default)]
    pub x_groq: Option<GroqExtension>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqExtension {
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub delta: Option<DeltaMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeltaMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<DeltaToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaToolCall {
    pub index: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<DeltaFunction>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeltaFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    pub fn usage_metadata(&self) -> Option<UsageMetadata> {
        self.usage
            .as_ref()
            .or_else(|| self.x_groq.as_ref().and_then(|x| x.usage.as_ref()))
            .map(|u| UsageMetadata {
                prompt_token_count: u.prompt_tokens as i32,
                candidates_token_count: u.completion_tokens as i32,
                total_token_count: u.total_tokens as i32,
            })
    }
}

/// Convert a finrep Content into a Groq message.
pub fn content_to_message(content: &Content) -> Message {
    let role = match content.role.as_str() {
        "model" | "assistant" => "assistant",
        "user" => "user",
        "system" => "system",
        "tool" | "function" => "tool",
        other => other,
    };

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut tool_call_id = None;

    for part in &content.parts {
        match part {
            Part::Text { text } => text_parts.push(text.clone()),
            Part::FunctionCall { name, args, id } => {
                tool_calls.push(ToolCall {
                    id: id.clone().unwrap_or_else(|| format!("call_{}", tool_calls.len())),
                    call_type: "function".to_string(),
                    function: FunctionCall {
                        name: name.clone(),
                        arguments: serde_json::to_string(args).unwrap_or_default(),
                    },
                });
            }
            Part::FunctionResponse { function_response, id } => {
                tool_call_id = id.clone();
                text_parts
                    .push(serde_json::to_string(&function_response.response).unwrap_or_default());
            }
        }
    }

    // Text parts are stream fragments of one message.
    let content_str = if text_parts.is_empty() { None } else { Some(text_parts.concat()) };

    Message {
        role: role.to_string(),
        content: content_str,
        tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
        tool_call_id,
    }
}

/// Expand a conversation into Groq messages.
///
/// A tool-role content carrying several function responses becomes one `tool` message per
/// response, since each must reference exactly one `tool_call_id`.
pub fn contents_to_messages(contents: &[Content]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(contents.len());
    for content in contents {
        let responses = content
            .parts
            .iter()
            .filter(|p| matches!(p, Part::FunctionResponse { .. }))
            .count();
        if responses > 1 {
            for part in &content.parts {
                let single = Content { role: content.role.clone(), parts: vec![part.clone()] };
                messages.push(content_to_message(&single));
            }
        } else {
            messages.push(content_to_message(content));
        }
    }
    messages
}

/// Convert function declarations into Groq tools, sorted by name for stable requests.
pub fn convert_tools(tools: &HashMap<String, Value>) -> Vec<Tool> {
    let mut converted: Vec<Tool> = tools
        .values()
        .filter_map(|tool| {
            let name = tool.get("name")?.as_str()?;
            let description = tool.get("description").and_then(|d| d.as_str()).unwrap_or("");
            let parameters = tool.get("parameters").cloned().unwrap_or(serde_json::json!({
                "type": "object",
                "properties": {}
            }));

            Some(Tool {
                tool_type: "function".to_string(),
                function: FunctionDef {
                    name: name.to_string(),
                    description: description.to_string(),
                    parameters,
                },
            })
        })
        .collect();
    converted.sort_by(|a, b| a.function.name.cmp(&b.function.name));
    converted
}

fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({}))
}

/// Convert a non-streaming Groq response into an LlmResponse.
pub fn from_response(response: &ChatCompletionResponse) -> LlmResponse {
    let choice = response.choices.first();

    let finish_reason =
        choice.and_then(|c| c.finish_reason.as_deref()).map(FinishReason::from_openai);

    let content = choice.and_then(|c| c.message.as_ref()).and_then(|msg| {
        let mut parts = Vec::new();

        if let Some(text) = &msg.content {
            if !text.is_empty() {
                parts.push(Part::Text { text: text.clone() });
            }
        }

        for tc in msg.tool_calls.iter().flatten() {
            parts.push(Part::FunctionCall {
                name: tc.function.name.clone(),
                args: parse_arguments(&tc.function.arguments),
                id: Some(tc.id.clone()),
            });
        }

        if parts.is_empty() { None } else { Some(Content { role: "model".to_string(), parts }) }
    });

    LlmResponse {
        content,
        usage_metadata: response.usage_metadata(),
        finish_reason,
        partial: false,
        turn_complete: true,
    }
}

/// Accumulates streamed tool-call fragments keyed by their index.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: HashMap<u32, (String, String, String)>,
}

impl ToolCallAccumulator {
    pub fn push(&mut self, delta: &DeltaToolCall) {
        let index = delta.index;
        let entry = self
            .calls
            .entry(index)
            .or_insert_with(|| (format!("call_{}", index), String::new(), String::new()));

        if let Some(id) = &delta.id {
            entry.0 = id.clone();
        }
        if let Some(func) = &delta.function {
            if let Some(name) = &func.name {
                entry.1 = name.clone();
            }
            if let Some(args_chunk) = &func.arguments {
                entry.2.push_str(args_chunk);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Drain accumulated calls in index order as function-call parts.
    pub fn drain_parts(&mut self) -> Vec<Part> {
        let mut sorted: Vec<_> = self.calls.drain().collect();
        sorted.sort_by_key(|(idx, _)| *idx);
        sorted
            .into_iter()
            .map(|(_, (id, name, args))| Part::FunctionCall {
                name,
                args: parse_arguments(&args),
                id: Some(id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_are_mapped() {
        assert_eq!(content_to_message(&Content::new("model").with_text("a")).role, "assistant");
        assert_eq!(content_to_message(&Content::new("system").with_text("a")).role, "system");
        assert_eq!(content_to_message(&Content::new("function")).role, "tool");
    }

    #[test]
    fn test_streamed_text_parts_are_concatenated() {
        let content = Content::new("model")
            .with_text("Rates are ")
            .with_text("on hold")
            .with_part(Part::FunctionCall {
                name: "read_article".into(),
                args: json!({"url": "https://x.example"}),
                id: Some("call_1".into()),
            });
        let msg = content_to_message(&content);
        assert_eq!(msg.content.as_deref(), Some("Rates are on hold"));
        assert_eq!(msg.tool_calls.unwrap().len(), 1);
    }

    #[test]
    fn test_function_call_becomes_tool_call() {
        let content = Content::new("model").with_part(Part::FunctionCall {
            name: "duckduckgo_search".into(),
            args: json!({"query": "fed rates"}),
            id: Some("call_abc".into()),
        });
        let msg = content_to_message(&content);
        assert!(msg.content.is_none());
        let calls = msg.tool_calls.unwrap();
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].function.arguments, r#"{"query":"fed rates"}"#);
    }

    #[test]
    fn test_multiple_tool_responses_are_split() {
        let content = Content::new("function")
            .with_part(Part::function_response("a", json!({"ok": 1}), Some("call_1".into())))
            .with_part(Part::function_response("b", json!({"ok": 2}), Some("call_2".into())));
        let messages = contents_to_messages(&[content]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(messages[1].content.as_deref(), Some(r#"{"ok":2}"#));
    }

    #[test]
    fn test_convert_tools_sorted() {
        let mut tools = HashMap::new();
        tools.insert("read_article".into(), json!({"name": "read_article", "description": "r"}));
        tools.insert(
            "duckduckgo_search".into(),
            json!({"name": "duckduckgo_search", "description": "s", "parameters": {"type": "object"}}),
        );
        let converted = convert_tools(&tools);
        assert_eq!(converted[0].function.name, "duckduckgo_search");
        assert_eq!(converted[1].function.parameters["properties"], json!({}));
    }

    #[test]
    fn test_from_response_with_tool_calls() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "x", "object": "chat.completion", "created": 1, "model": "m",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1", "type": "function",
                        "function": {"name": "read_article", "arguments": "{\"url\":\"https://a.b\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let resp = from_response(&response);
        let content = resp.content.unwrap();
        assert!(content.has_function_calls());
        assert_eq!(resp.finish_reason, Some(FinishReason::Stop));
        assert_eq!(resp.usage_metadata.unwrap().total_token_count, 15);
    }

    #[test]
    fn test_accumulator_joins_fragments() {
        let mut acc = ToolCallAccumulator::default();
        acc.push(&DeltaToolCall {
            index: 0,
            id: Some("call_9".into()),
            function: Some(DeltaFunction {
                name: Some("duckduckgo_search".into()),
                arguments: Some("{\"que".into()),
            }),
        });
        acc.push(&DeltaToolCall {
            index: 0,
            id: None,
            function: Some(DeltaFunction { name: None, arguments: Some("ry\":\"oil\"}".into()) }),
        });
        let parts = acc.drain_parts();
        assert!(acc.is_empty());
        assert_eq!(
            parts[0],
            Part::FunctionCall {
                name: "duckduckgo_search".into(),
                args: json!({"query": "oil"}),
                id: Some("call_9".into()),
            }
        );
    }
}
