use crate::types::Content;
use async_trait::async_trait;

#[async_trait]
pub trait ReadonlyContext: Send + Sync {
    fn invocation_id(&self) -> &str;
    fn agent_name(&self) -> &str;
    fn user_content(&self) -> &Content;
}

#[async_trait]
pub trait InvocationContext: ReadonlyContext {
    fn run_config(&self) -> &RunConfig;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingMode {
    None,
    SSE,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// How the agent asks the model for output. The HTTP caller always receives the final
    /// report in one piece; this only affects the model transport.
    pub streaming_mode: StreamingMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { streaming_mode: StreamingMode::SSE }
    }
}

impl RunConfig {
    pub fn stream(&self) -> bool {
        self.streaming_mode == StreamingMode::SSE
    }
}
