use crate::ServerConfig;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub groq_api_key_set: bool,
    pub agno_api_key_set: bool,
}

/// Liveness plus credential presence. Never reveals the keys themselves.
pub async fn health(State(config): State<ServerConfig>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        groq_api_key_set: config.credentials.groq_api_key_set(),
        agno_api_key_set: config.credentials.agno_api_key_set(),
    })
}
