use async_stream::stream;
use async_trait::async_trait;
use finrep_core::{
    Agent, Content, Event, EventStream, InvocationContext, Llm, LlmRequest, Part, ReadonlyContext,
    ReportError, Result, RunConfig, Tool, ToolContext,
};
use finrep_telemetry::{Instrument, agent_run_span, tool_execute_span};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Default bound on model calls per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

pub struct LlmAgent {
    name: String,
    description: String,
    model: Arc<dyn Llm>,
    instruction: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("model", &self.model.name())
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

pub struct LlmAgentBuilder {
    name: String,
    description: Option<String>,
    model: Option<Arc<dyn Llm>>,
    instruction: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
}

impl LlmAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            model: None,
            instruction: None,
            tools: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn model(mut self, model: Arc<dyn Llm>) -> Self {
        self.model = Some(model);
        self
    }

    /// System instruction sent ahead of the user's message.
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn build(self) -> Result<LlmAgent> {
        let model = self.model.ok_or_else(|| ReportError::Agent("Model is required".to_string()))?;

        if self.max_iterations == 0 {
            return Err(ReportError::Agent("max_iterations must be at least 1".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name().to_string()) {
                return Err(ReportError::Agent(format!("Duplicate tool name: {}", tool.name())));
            }
        }

        Ok(LlmAgent {
            name: self.name,
            description: self.description.unwrap_or_default(),
            model,
            instruction: self.instruction,
            tools: self.tools,
            max_iterations: self.max_iterations,
        })
    }
}

/// A tool call made during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub args: Value,
}

/// Result of [`LlmAgent::run_query`].
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// Text of the final model turn.
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Invocation context for a single standalone query.
struct QueryContext {
    invocation_id: String,
    agent_name: String,
    user_content: Content,
    run_config: RunConfig,
}

#[async_trait]
impl ReadonlyContext for QueryContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn agent_name(&self) -> &str {
        &self.agent_name
    }

    fn user_content(&self) -> &Content {
        &self.user_content
    }
}

#[async_trait]
impl InvocationContext for QueryContext {
    fn run_config(&self) -> &RunConfig {
        &self.run_config
    }
}

struct AgentToolContext {
    parent_ctx: Arc<dyn InvocationContext>,
    function_call_id: String,
}

impl AgentToolContext {
    fn new(parent_ctx: Arc<dyn InvocationContext>, function_call_id: String) -> Self {
        Self { parent_ctx, function_call_id }
    }
}

#[async_trait]
impl ReadonlyContext for AgentToolContext {
    fn invocation_id(&self) -> &str {
        self.parent_ctx.invocation_id()
    }

    fn agent_name(&self) -> &str {
        self.parent_ctx.agent_name()
    }

    fn user_content(&self) -> &Content {
        self.parent_ctx.user_content()
    }
}

#[async_trait]
impl ToolContext for AgentToolContext {
    fn function_call_id(&self) -> &str {
        &self.function_call_id
    }
}

impl LlmAgent {
    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run the agent on a single query and wait for its final answer.
    pub async fn run_query(&self, query: &str) -> Result<RunOutput> {
        self.run_query_with(query, RunConfig::default()).await
    }

    pub async fn run_query_with(&self, query: &str, run_config: RunConfig) -> Result<RunOutput> {
        let ctx = Arc::new(QueryContext {
            invocation_id: uuid::Uuid::new_v4().to_string(),
            agent_name: self.name.clone(),
            user_content: Content::new("user").with_text(query),
            run_config,
        });
        let span = agent_run_span(&self.name, &ctx.invocation_id);

        async move {
            let mut events = self.run(ctx).await?;
            let mut final_text = String::new();
            let mut tool_calls = Vec::new();

            while let Some(event) = events.next().await {
                let event = event?;
                let Some(content) = event.content() else { continue };

                if content.role == "function" {
                    // A new model turn follows every round of tool responses.
                    final_text.clear();
                    continue;
                }

                for part in &content.parts {
                    match part {
                        Part::Text { text } => final_text.push_str(text),
                        Part::FunctionCall { name, args, .. } => tool_calls
                            .push(ToolCallRecord { name: name.clone(), args: args.clone() }),
                        Part::FunctionResponse { .. } => {}
                    }
                }
            }

            if final_text.trim().is_empty() {
                return Err(ReportError::Agent("Agent produced an empty response".to_string()));
            }

            tracing::info!(
                tool_calls = tool_calls.len(),
                chars = final_text.len(),
                "Agent run complete"
            );
            Ok(RunOutput { content: final_text, tool_calls })
        }
        .instrument(span)
        .await
    }

    fn tool_declarations(&self) -> HashMap<String, Value> {
        self.tools.iter().map(|tool| (tool.name().to_string(), tool.declaration())).collect()
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        tracing::info!(
            agent.name = %self.name,
            invocation.id = %ctx.invocation_id(),
            "Starting agent execution"
        );

        let agent_name = self.name.clone();
        let invocation_id = ctx.invocation_id().to_string();
        let model = self.model.clone();
        let tools = self.tools.clone();
        let tool_declarations = self.tool_declarations();
        let instruction = self.instruction.clone();
        let max_iterations = self.max_iterations;
        let stream_model = ctx.run_config().stream();

        let s = stream! {
            let mut conversation_history = Vec::new();

            if let Some(instruction) = instruction.filter(|i| !i.is_empty()) {
                conversation_history.push(Content::new("system").with_text(instruction));
            }
            conversation_history.push(ctx.user_content().clone());

            let mut iteration = 0;

            loop {
                iteration += 1;
                if iteration > max_iterations {
                    yield Err(ReportError::Agent(format!(
                        "Max iterations ({}) exceeded",
                        max_iterations
                    )));
                    return;
                }

                let mut request = LlmRequest::new(model.name(), conversation_history.clone());
                request.tools = tool_declarations.clone();

                let mut response_stream = match model.generate_content(request, stream_model).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let mut accumulated_content: Option<Content> = None;

                while let Some(chunk_result) = response_stream.next().await {
                    let chunk = match chunk_result {
                        Ok(c) => c,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };

                    let mut event = Event::new(&invocation_id);
                    event.author = agent_name.clone();
                    event.llm_response = chunk.clone();
                    yield Ok(event);

                    if let Some(chunk_content) = chunk.content {
                        if let Some(ref mut acc) = accumulated_content {
                            acc.parts.extend(chunk_content.parts);
                        } else {
                            accumulated_content = Some(chunk_content);
                        }
                    }

                    if chunk.turn_complete {
                        break;
                    }
                }

                let Some(content) = accumulated_content else {
                    break;
                };
                conversation_history.push(content.clone());

                if !content.has_function_calls() {
                    break;
                }

                for part in &content.parts {
                    let Part::FunctionCall { name, args, id } = part else {
                        continue;
                    };

                    let result = match tools.iter().find(|t| t.name() == name) {
                        Some(tool) => {
                            let call_id = id
                                .clone()
                                .unwrap_or_else(|| format!("{}_{}", invocation_id, name));
                            let tool_ctx: Arc<dyn ToolContext> =
                                Arc::new(AgentToolContext::new(ctx.clone(), call_id));

                            match tool
                                .execute(tool_ctx, args.clone())
                                .instrument(tool_execute_span(name))
                                .await
                            {
                                Ok(result) => result,
                                Err(e) => {
                                    tracing::warn!(tool = %name, error = %e, "Tool execution failed");
                                    json!({ "error": e.to_string() })
                                }
                            }
                        }
                        None => {
                            tracing::warn!(tool = %name, "Model called an unknown tool");
                            json!({ "error": format!("Tool {} not found", name) })
                        }
                    };

                    let response = Content::new("function")
                        .with_part(Part::function_response(name.clone(), result, id.clone()));

                    let mut tool_event = Event::new(&invocation_id);
                    tool_event.author = agent_name.clone();
                    tool_event.set_content(response.clone());
                    yield Ok(tool_event);

                    conversation_history.push(response);
                }
            }
        };

        Ok(Box::pin(s))
    }
}
