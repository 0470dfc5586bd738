//! Span helpers for agent, model, and tool operations.

use tracing::Span;

/// Create a span for agent execution
///
/// # Example
/// ```
/// use finrep_telemetry::agent_run_span;
/// let span = agent_run_span("research_agent", "inv-123");
/// let _enter = span.enter();
/// ```
pub fn agent_run_span(agent_name: &str, invocation_id: &str) -> Span {
    tracing::info_span!("agent.run", agent.name = agent_name, invocation.id = invocation_id)
}

/// Create a span for model API calls
pub fn model_call_span(model_name: &str) -> Span {
    tracing::info_span!("model.call", model.name = model_name)
}

/// Create a span for tool execution
pub fn tool_execute_span(tool_name: &str) -> Span {
    tracing::info_span!("tool.execute", tool.name = tool_name)
}
