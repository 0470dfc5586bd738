use async_trait::async_trait;
use finrep_core::{Content, ReadonlyContext, Tool, ToolContext};
use finrep_tool::builtin::parse_results;
use finrep_tool::{ArticleReaderTool, DuckDuckGoSearchTool, FunctionTool};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct MockToolContext {
    content: Content,
}

impl MockToolContext {
    fn new() -> Self {
        Self { content: Content::new("user") }
    }
}

#[async_trait]
impl ReadonlyContext for MockToolContext {
    fn invocation_id(&self) -> &str { "inv-1" }
    fn agent_name(&self) -> &str { "test-agent" }
    fn user_content(&self) -> &Content { &self.content }
}

#[async_trait]
impl ToolContext for MockToolContext {
    fn function_call_id(&self) -> &str { "call-1" }
}

fn ctx() -> Arc<dyn ToolContext> {
    Arc::new(MockToolContext::new())
}

const RESULTS_PAGE: &str = r##"
<div class="result results_links results_links_deep result--ad">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://duckduckgo.com/y.js?ad_domain=broker.example">Open an account</a>
  </h2>
  <a class="result__snippet" href="https://duckduckgo.com/y.js?x=1">Sponsored</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.reuters.com%2Fmarkets%2Fus%2Ffed%2D2024%2F&amp;rut=1f">Fed holds <b>rates</b> steady</a>
  </h2>
  <a class="result__url" href="//duckduckgo.com/l/?uddg=x">reuters.com</a>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">The Federal Reserve held rates at 5.25%&#x2F;5.5% on Wednesday&hellip;</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.ft.com%2Fcontent%2Fabc&amp;rut=2a">FT: rate path</a>
  </h2>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.wsj.com%2Fx&amp;rut=3b">WSJ coverage</a>
  </h2>
  <a class="result__snippet" href="#">Markets rallied.</a>
</div>
"##;

#[test]
fn test_parse_results_skips_ads_and_decodes_urls() {
    let results = parse_results(RESULTS_PAGE, 10);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].title, "Fed holds rates steady");
    assert_eq!(results[0].url, "https://www.reuters.com/markets/us/fed-2024/");
    assert_eq!(
        results[0].snippet,
        "The Federal Reserve held rates at 5.25%/5.5% on Wednesday\u{2026}"
    );
    assert_eq!(results[1].url, "https://www.ft.com/content/abc");
    assert_eq!(results[1].snippet, "");
    assert_eq!(results[2].snippet, "Markets rallied.");
}

#[test]
fn test_parse_results_respects_limit() {
    let results = parse_results(RESULTS_PAGE, 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Fed holds rates steady");
    assert!(parse_results("<html>no results</html>", 5).is_empty());
}

#[tokio::test]
async fn test_duckduckgo_search_queries_html_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "fed rate decision"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let tool = DuckDuckGoSearchTool::with_base_url(server.uri()).unwrap();
    let out = tool
        .execute(ctx(), json!({"query": "fed rate decision", "max_results": 2}))
        .await
        .unwrap();

    assert_eq!(out["query"], "fed rate decision");
    let results = out["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["title"], "FT: rate path");
}

#[tokio::test]
async fn test_duckduckgo_search_requires_query() {
    let tool = DuckDuckGoSearchTool::with_base_url("http://127.0.0.1:9").unwrap();
    let err = tool.execute(ctx(), json!({"query": "   "})).await.unwrap_err();
    assert_eq!(err.kind(), "tool");
}

#[tokio::test]
async fn test_duckduckgo_search_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tool = DuckDuckGoSearchTool::with_base_url(server.uri()).unwrap();
    let err = tool.execute(ctx(), json!({"query": "oil"})).await.unwrap_err();
    assert!(err.message().contains("503"));
}

#[tokio::test]
async fn test_read_article_extracts_metadata() {
    let page = r#"<html><head>
        <title>Ignored | Site</title>
        <meta property="og:title" content="Oil jumps on supply cuts">
        <meta name="author" content="Jane Roe">
        <meta property="article:published_time" content="2024-06-12T18:00:00Z">
        <meta name="description" content="Brent rose 3%.">
        </head><body><article>
        <p>Brent crude rose 3% on Monday.</p>
        <p>Analysts expect tighter supply.</p>
        </article></body></html>"#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/oil"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let url = format!("{}/news/oil", server.uri());
    let out = ArticleReaderTool::new().unwrap().execute(ctx(), json!({"url": url})).await.unwrap();

    assert_eq!(out["url"], url.as_str());
    assert_eq!(out["title"], "Oil jumps on supply cuts");
    assert_eq!(out["authors"], json!(["Jane Roe"]));
    assert_eq!(out["publish_date"], "2024-06-12T18:00:00Z");
    assert_eq!(out["description"], "Brent rose 3%.");
    assert_eq!(out["text"], "Brent crude rose 3% on Monday.\n\nAnalysts expect tighter supply.");
    assert_eq!(out["truncated"], false);
}

#[tokio::test]
async fn test_read_article_rejects_non_http_urls() {
    let err = ArticleReaderTool::new().unwrap()
        .execute(ctx(), json!({"url": "file:///etc/passwd"}))
        .await
        .unwrap_err();
    assert!(err.message().contains("http:// or https://"));

    let err = ArticleReaderTool::new().unwrap().execute(ctx(), json!({})).await.unwrap_err();
    assert!(err.message().contains("missing 'url'"));
}

#[tokio::test]
async fn test_read_article_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = ArticleReaderTool::new().unwrap()
        .execute(ctx(), json!({"url": format!("{}/gone", server.uri())}))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Tool error: HTTP 404"));
}

#[tokio::test]
async fn test_function_tool_declaration_and_call() {
    let tool = FunctionTool::new("get_quote", "Latest price for a ticker", |_ctx, args| async move {
        Ok(json!({ "ticker": args["ticker"], "price": 101.5 }))
    })
    .with_parameters(json!({
        "type": "object",
        "properties": { "ticker": { "type": "string" } },
        "required": ["ticker"]
    }));

    let decl = tool.declaration();
    assert_eq!(decl["name"], "get_quote");
    assert_eq!(decl["parameters"]["required"], json!(["ticker"]));

    let out = tool.execute(ctx(), json!({"ticker": "AAPL"})).await.unwrap();
    assert_eq!(out, json!({"ticker": "AAPL", "price": 101.5}));
}
