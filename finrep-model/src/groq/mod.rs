//! Groq provider.
//!
//! Groq serves open models over an OpenAI-compatible chat completions API. The client
//! supports tool calling and SSE streaming; streamed tool-call fragments are joined back
//! into whole function calls before they reach the agent.
//!
//! # Example
//!
//! ```rust,ignore
//! use finrep_model::groq::{GroqClient, GroqConfig};
//!
//! let client = GroqClient::new(GroqConfig::llama70b(
//!     std::env::var("GROQ_API_KEY").unwrap()
//! ))?;
//! ```

mod client;
mod config;
mod convert;

pub use client::GroqClient;
pub use config::{DEFAULT_GROQ_MODEL, GROQ_API_BASE, GroqConfig};
