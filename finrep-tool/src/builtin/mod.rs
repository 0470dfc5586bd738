use finrep_core::{ReportError, Result};
use std::time::Duration;

mod article;
mod duckduckgo;

pub use article::{ArticleReaderTool, DEFAULT_MAX_LENGTH};
pub use duckduckgo::{DEFAULT_MAX_RESULTS, DuckDuckGoSearchTool, SearchResult, parse_results};

/// User agent sent by the web tools. DuckDuckGo rejects requests without one.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) finrep/0.1";

/// HTTP client shared by the web tools' constructors.
pub(crate) fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))
}
