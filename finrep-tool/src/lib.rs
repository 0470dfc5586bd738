//! # finrep-tool
//!
//! Tools available to finrep agents.
//!
//! - [`FunctionTool`] - Wrap an async closure as a tool
//! - [`DuckDuckGoSearchTool`] - Web search through DuckDuckGo's HTML endpoint
//! - [`ArticleReaderTool`] - Fetch a news article and extract its metadata and text
//!
//! ```rust,no_run
//! use finrep_tool::FunctionTool;
//! use finrep_core::{ToolContext, Result};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! async fn get_quote(_ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
//!     let ticker = args["ticker"].as_str().unwrap_or("UNKNOWN");
//!     Ok(json!({ "ticker": ticker, "price": 101.5 }))
//! }
//!
//! let tool = FunctionTool::new("get_quote", "Latest price for a ticker", get_quote);
//! ```

pub mod builtin;
mod function_tool;
pub mod html;

pub use builtin::{ArticleReaderTool, DuckDuckGoSearchTool};
pub use function_tool::FunctionTool;
