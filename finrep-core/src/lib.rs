//! # finrep-core
//!
//! Core traits and types shared by the finrep crates.
//!
//! ## Overview
//!
//! - [`Agent`] - Anything that turns an invocation into a stream of [`Event`]s
//! - [`Llm`] - A chat model provider
//! - [`Tool`] - A capability the model may call during a run
//! - [`ReportError`] / [`Result`] - Unified error handling
//!
//! ## Core Traits
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait Agent: Send + Sync {
//!     fn name(&self) -> &str;
//!     fn description(&self) -> &str;
//!     async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream>;
//! }
//!
//! #[async_trait]
//! pub trait Tool: Send + Sync {
//!     fn name(&self) -> &str;
//!     fn description(&self) -> &str;
//!     async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value>;
//! }
//! ```

pub mod agent;
pub mod context;
pub mod error;
pub mod event;
pub mod model;
pub mod tool;
pub mod types;

pub use agent::{Agent, EventStream};
pub use context::{InvocationContext, ReadonlyContext, RunConfig, StreamingMode};
pub use error::{ReportError, Result};
pub use event::Event;
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, LlmResponseStream,
    UsageMetadata,
};
pub use tool::{Tool, ToolContext};
pub use types::{Content, FunctionResponseData, Part};
