//! # finrep-agent
//!
//! The tool-calling agent loop and the financial research agent built on it.
//!
//! ```rust,no_run
//! use finrep_agent::create_research_agent;
//!
//! # async fn run() -> finrep_core::Result<()> {
//! let agent = create_research_agent(&std::env::var("GROQ_API_KEY").unwrap())?;
//! let output = agent.run_query("Impact of rising rates on regional banks").await?;
//! println!("{}", output.content);
//! # Ok(())
//! # }
//! ```

mod llm_agent;
pub mod research;

pub use finrep_core::Agent;
pub use llm_agent::{DEFAULT_MAX_ITERATIONS, LlmAgent, LlmAgentBuilder, RunOutput, ToolCallRecord};
pub use research::{
    ResearchAgentConfig, create_research_agent, create_research_agent_from_config,
    create_research_agent_with,
};
