use crate::{ServerConfig, error::ApiError};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Missing and `null` are treated like an empty query.
    #[serde(default)]
    pub query: Option<String>,
}

/// Response envelope shared by success and failure.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn success(report: String) -> Self {
        Self { success: true, report: Some(report), error: None }
    }

    pub fn failure(error: String) -> Self {
        Self { success: false, report: None, error: Some(error) }
    }
}

/// `POST /generate`: validate, check credentials, then run the report generator.
pub async fn generate_report(
    State(config): State<ServerConfig>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge
        } else {
            ApiError::InvalidBody(rejection.body_text())
        }
    })?;

    // Forwarded verbatim. Only an absent or zero-length query is rejected.
    let query = request.query.as_deref().unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::EmptyQuery);
    }

    if !config.credentials.groq_api_key_set() {
        return Err(ApiError::MissingApiKey);
    }

    tracing::info!(query_chars = query.chars().count(), "Generating report");
    let report = config.generator.generate(query).await?;

    Ok(Json(GenerateResponse::success(report)))
}
