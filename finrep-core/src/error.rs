#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ReportError {
    /// Short category label, suitable for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Agent(_) => "agent",
            ReportError::Model(_) => "model",
            ReportError::Tool(_) => "tool",
            ReportError::Config(_) => "config",
            ReportError::Io(_) => "io",
            ReportError::Serde(_) => "serde",
        }
    }

    /// The underlying message without the category prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            ReportError::Agent(msg)
            | ReportError::Model(msg)
            | ReportError::Tool(msg)
            | ReportError::Config(msg) => msg.clone(),
            ReportError::Io(err) => err.to_string(),
            ReportError::Serde(err) => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
