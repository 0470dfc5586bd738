use super::{USER_AGENT, http_client};
use crate::html;
use async_trait::async_trait;
use finrep_core::{ReportError, Result, Tool, ToolContext};
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

const DUCKDUCKGO_HTML_BASE: &str = "https://html.duckduckgo.com";

pub const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_LIMIT: usize = 10;

static RESULT_LINK_REGEX: OnceLock<Regex> = OnceLock::new();
static RESULT_SNIPPET_REGEX: OnceLock<Regex> = OnceLock::new();
static HREF_REGEX: OnceLock<Regex> = OnceLock::new();

fn result_link_regex() -> &'static Regex {
    RESULT_LINK_REGEX.get_or_init(|| {
        Regex::new(r#"(?is)<a\s([^>]*class="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#)
            .expect("Invalid regex pattern")
    })
}

fn result_snippet_regex() -> &'static Regex {
    RESULT_SNIPPET_REGEX.get_or_init(|| {
        Regex::new(r#"(?is)<(?:a|div|td)\s[^>]*class="[^"]*\bresult__snippet\b[^"]*"[^>]*>(.*?)</(?:a|div|td)>"#)
            .expect("Invalid regex pattern")
    })
}

fn href_regex() -> &'static Regex {
    HREF_REGEX.get_or_init(|| Regex::new(r#"href="([^"]*)""#).expect("Invalid regex pattern"))
}

/// One organic search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Resolve a result href to the target URL.
///
/// Organic links point at DuckDuckGo's redirector with the real URL in `uddg`.
fn resolve_href(raw: &str) -> Option<String> {
    let href = html::decode_entities(raw);

    if let Some(start) = href.find("uddg=") {
        let encoded = &href[start + "uddg=".len()..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        return urlencoding::decode(encoded).ok().map(|u| u.into_owned());
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href);
    }

    None
}

/// Parse organic results from a DuckDuckGo HTML results page.
///
/// Ads (links through `duckduckgo.com/y.js`) and links that cannot be resolved are skipped.
pub fn parse_results(page: &str, max_results: usize) -> Vec<SearchResult> {
    let links: Vec<_> = result_link_regex().captures_iter(page).collect();
    let mut results = Vec::new();

    for (i, caps) in links.iter().enumerate() {
        if results.len() >= max_results {
            break;
        }

        let Some(href) = href_regex().captures(&caps[1]).map(|h| h[1].to_string()) else {
            continue;
        };
        if href.contains("duckduckgo.com/y.js") {
            continue;
        }
        let Some(url) = resolve_href(&href) else {
            continue;
        };

        let title = html::strip_tags(&caps[2]);
        if title.is_empty() {
            continue;
        }

        // The snippet sits between this link and the next one.
        let Some(whole) = caps.get(0) else { continue };
        let section_end =
            links.get(i + 1).and_then(|next| next.get(0)).map_or(page.len(), |m| m.start());
        let snippet = result_snippet_regex()
            .captures(&page[whole.end()..section_end])
            .map(|s| html::strip_tags(&s[1]))
            .unwrap_or_default();

        results.push(SearchResult { title, url, snippet });
    }

    results
}

/// Web search through DuckDuckGo's HTML endpoint. Needs no API key.
pub struct DuckDuckGoSearchTool {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearchTool {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DUCKDUCKGO_HTML_BASE)
    }

    /// Point the tool at another host serving the same `/html/` page.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = http_client(USER_AGENT, Duration::from_secs(15))?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Returns titles, URLs and snippets of the top results."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 5, at most 10)"
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ReportError::Tool("duckduckgo_search: missing 'query'".to_string()))?;

        let max_results = args
            .get("max_results")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_MAX_RESULTS, |n| n as usize)
            .clamp(1, MAX_RESULTS_LIMIT);

        let url = format!(
            "{}/html/?q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );
        tracing::debug!(%query, max_results, "Searching DuckDuckGo");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReportError::Tool(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Tool(format!("Search failed with HTTP {}", status)));
        }

        let page = response
            .text()
            .await
            .map_err(|e| ReportError::Tool(format!("Failed to read search response: {}", e)))?;

        let results = parse_results(&page, max_results);
        tracing::debug!(%query, count = results.len(), "DuckDuckGo search complete");

        Ok(json!({ "query": query, "results": results }))
    }
}
