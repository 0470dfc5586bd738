use crate::rest::controllers::report::GenerateResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use finrep_core::ReportError;

/// Failure of a `/generate` request, rendered as the JSON failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Please provide a research query")]
    EmptyQuery,

    #[error("GROQ_API_KEY not configured. Please set the environment variable.")]
    MissingApiKey,

    /// The error category is logged, only its message reaches the client.
    #[error("An error occurred: {}", .0.message())]
    Generation(#[source] ReportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::EmptyQuery => StatusCode::BAD_REQUEST,
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MissingApiKey | ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Generation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Generation(err) => {
                tracing::error!(error.kind = err.kind(), error = %err, "Report generation failed");
            }
            ApiError::MissingApiKey => tracing::error!("Rejected /generate: GROQ_API_KEY is not set"),
            other => tracing::debug!(error = %other, "Rejected /generate request"),
        }

        (self.status(), Json(GenerateResponse::failure(self.to_string()))).into_response()
    }
}
