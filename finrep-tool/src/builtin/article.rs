use super::{USER_AGENT, http_client};
use crate::html;
use async_trait::async_trait;
use finrep_core::{ReportError, Result, Tool, ToolContext};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Default cap on returned article text, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 5000;

/// Fetches a news article and returns its metadata and body text.
pub struct ArticleReaderTool {
    client: reqwest::Client,
}

impl ArticleReaderTool {
    pub fn new() -> Result<Self> {
        Ok(Self { client: http_client(USER_AGENT, Duration::from_secs(20))? })
    }

    /// Build the tool output for an already fetched page.
    pub fn extract(url: &str, page: &str, max_length: usize) -> Value {
        let title = html::meta_content(page, "og:title").or_else(|| html::title(page));
        let authors: Vec<String> = html::meta_content(page, "author")
            .map(|a| {
                a.split([',', ';'])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let publish_date = html::meta_content(page, "article:published_time")
            .or_else(|| html::meta_content(page, "date"));
        let description = html::meta_content(page, "description")
            .or_else(|| html::meta_content(page, "og:description"));

        let paragraphs = html::paragraphs(page);
        let body =
            if paragraphs.is_empty() { html::extract_text(page) } else { paragraphs.join("\n\n") };
        let (text, truncated) = html::truncate_chars(&body, max_length);

        json!({
            "url": url,
            "title": title,
            "authors": authors,
            "publish_date": publish_date,
            "description": description,
            "text": text,
            "truncated": truncated,
        })
    }
}

#[async_trait]
impl Tool for ArticleReaderTool {
    fn name(&self) -> &str {
        "read_article"
    }

    fn description(&self) -> &str {
        "Read a news article or web page. Returns the title, authors, publish date, \
         description and the article text."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the article"
                },
                "max_length": {
                    "type": "integer",
                    "description": "Maximum characters of article text to return (default 5000)"
                }
            },
            "required": ["url"]
        }))
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let url = args
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| ReportError::Tool("read_article: missing 'url'".to_string()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ReportError::Tool(format!(
                "read_article: URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        let max_length = args
            .get("max_length")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_MAX_LENGTH, |n| n as usize);

        tracing::debug!(%url, "Fetching article");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReportError::Tool(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Tool(format!("HTTP {} fetching {}", status, url)));
        }

        let page = response
            .text()
            .await
            .map_err(|e| ReportError::Tool(format!("Failed to read {}: {}", url, e)))?;

        Ok(Self::extract(url, &page, max_length))
    }
}
