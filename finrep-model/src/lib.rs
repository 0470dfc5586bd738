//! # finrep-model
//!
//! LLM provider integrations for finrep.
//!
//! - [`GroqClient`] - Groq chat completions (llama-3.3-70b-versatile by default)
//! - [`MockLlm`] - Scripted model for tests
//!
//! ```rust,no_run
//! use finrep_model::GroqClient;
//!
//! let api_key = std::env::var("GROQ_API_KEY").unwrap();
//! let model = GroqClient::llama70b(api_key).unwrap();
//! ```

pub mod groq;
pub mod mock;

pub use groq::{DEFAULT_GROQ_MODEL, GroqClient, GroqConfig};
pub use mock::MockLlm;
