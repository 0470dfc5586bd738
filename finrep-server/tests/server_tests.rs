use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use finrep_core::{ReportError, Result};
use finrep_server::{Credentials, ReportGenerator, ServerConfig, create_app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

enum Reply {
    Report(&'static str),
    Fail(ReportError),
    Hang,
}

struct MockGenerator {
    reply: Reply,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockGenerator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self { reply, calls: AtomicUsize::new(0), queries: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportGenerator for MockGenerator {
    async fn generate(&self, query: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        match &self.reply {
            Reply::Report(report) => Ok(report.to_string()),
            Reply::Fail(err) => Err(ReportError::Model(err.message().to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
        }
    }
}

fn with_key() -> Credentials {
    Credentials::new(Some("gsk_test".to_string()), None)
}

fn config(credentials: Credentials, generator: Arc<MockGenerator>) -> ServerConfig {
    ServerConfig::new(credentials, generator)
}

fn generate_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(config: ServerConfig, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_app(config).oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_generate_returns_report() {
    let generator = MockGenerator::new(Reply::Report("X"));
    let (status, body) = send(
        config(with_key(), generator.clone()),
        generate_request(json!({"query": "Impact of rate cuts on banks"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "report": "X"}));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_query_is_forwarded_verbatim() {
    for query in ["   ", "  bank stocks \n"] {
        let generator = MockGenerator::new(Reply::Report("X"));
        let (status, _) = send(
            config(with_key(), generator.clone()),
            generate_request(json!({ "query": query }).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(generator.queries(), vec![query.to_string()]);
    }
}

#[tokio::test]
async fn test_empty_or_missing_query_is_rejected_before_generation() {
    for payload in [json!({"query": ""}), json!({}), json!({"query": null})] {
        let generator = MockGenerator::new(Reply::Report("unused"));
        let (status, body) =
            send(config(with_key(), generator.clone()), generate_request(payload.to_string()))
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Please provide a research query"}));
        assert_eq!(generator.calls(), 0);
    }
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    for payload in ["{not json", r#"{"query": 42}"#] {
        let generator = MockGenerator::new(Reply::Report("unused"));
        let (status, body) =
            send(config(with_key(), generator.clone()), generate_request(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body: "));
        assert_eq!(generator.calls(), 0);
    }
}

#[tokio::test]
async fn test_validation_runs_before_credential_check() {
    let generator = MockGenerator::new(Reply::Report("unused"));
    let (status, _) =
        send(config(Credentials::default(), generator), generate_request(r#"{"query": ""}"#))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_api_key() {
    let generator = MockGenerator::new(Reply::Report("unused"));
    let (status, body) = send(
        config(Credentials::default(), generator.clone()),
        generate_request(r#"{"query": "oil prices"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "GROQ_API_KEY not configured. Please set the environment variable."
        })
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_generation_failure_is_reported() {
    let generator = MockGenerator::new(Reply::Fail(ReportError::Model("boom".to_string())));
    let (status, body) =
        send(config(with_key(), generator), generate_request(r#"{"query": "oil"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "An error occurred: boom"}));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let generator = MockGenerator::new(Reply::Report("unused"));
    let config = config(with_key(), generator.clone()).with_max_body_size(64);
    let payload = json!({"query": "a".repeat(1024)}).to_string();

    let (status, body) = send(config, generate_request(payload)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_request_timeout_when_configured() {
    let generator = MockGenerator::new(Reply::Hang);
    let config =
        config(with_key(), generator).with_request_timeout(Duration::from_millis(50));

    let response =
        create_app(config).oneshot(generate_request(r#"{"query": "oil"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_health_reports_credentials() {
    let request = || Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) =
        send(config(Credentials::default(), MockGenerator::new(Reply::Hang)), request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "groq_api_key_set": false, "agno_api_key_set": false})
    );

    let both = Credentials::new(Some("gsk".into()), Some("ag".into()));
    let (_, body) = send(config(both, MockGenerator::new(Reply::Hang)), request()).await;
    assert_eq!(body["groq_api_key_set"], true);
    assert_eq!(body["agno_api_key_set"], true);
}

#[tokio::test]
async fn test_health_is_unaffected_by_generate_calls() {
    let generator = MockGenerator::new(Reply::Fail(ReportError::Model("down".into())));
    let config = config(with_key(), generator);

    let (status, _) = send(config.clone(), generate_request(r#"{"query": "oil"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) =
        send(config, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["groq_api_key_set"], true);
}

#[tokio::test]
async fn test_index_served_without_credentials() {
    let app = create_app(config(Credentials::default(), MockGenerator::new(Reply::Hang)));
    let response =
        app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<form id=\"query-form\">"));
}

#[tokio::test]
async fn test_static_assets() {
    let app = create_app(config(Credentials::default(), MockGenerator::new(Reply::Hang)));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap().contains("javascript")
    );

    let response = app
        .oneshot(Request::builder().uri("/static/missing.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_restricted_to_configured_origins() {
    let config = config(with_key(), MockGenerator::new(Reply::Hang))
        .with_allowed_origins(vec!["https://reports.example.com".to_string()]);
    let request = |origin: &str| {
        Request::builder()
            .uri("/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let app = create_app(config);
    let allowed = app.clone().oneshot(request("https://reports.example.com")).await.unwrap();
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://reports.example.com"
    );

    let denied = app.oneshot(request("https://evil.example.com")).await.unwrap();
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
