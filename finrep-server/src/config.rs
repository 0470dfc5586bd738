use crate::generator::ReportGenerator;
use std::{sync::Arc, time::Duration};

pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const AGNO_API_KEY_ENV: &str = "AGNO_API_KEY";

/// Default maximum request body size (1 MiB). Queries are short text.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Provider credentials, read once at startup.
///
/// An empty value counts as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub groq_api_key: Option<String>,
    /// Reported by `/health` only.
    pub agno_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("groq_api_key_set", &self.groq_api_key_set())
            .field("agno_api_key_set", &self.agno_api_key_set())
            .finish()
    }
}

impl Credentials {
    pub fn new(groq_api_key: Option<String>, agno_api_key: Option<String>) -> Self {
        Self { groq_api_key: non_empty(groq_api_key), agno_api_key: non_empty(agno_api_key) }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(lookup(GROQ_API_KEY_ENV), lookup(AGNO_API_KEY_ENV))
    }

    pub fn groq_api_key_set(&self) -> bool {
        self.groq_api_key.is_some()
    }

    pub fn agno_api_key_set(&self) -> bool {
        self.agno_api_key.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Security configuration for the HTTP layer.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Server-wide request timeout. `None` lets report generation run to completion.
    pub request_timeout: Option<Duration>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout: None,
        }
    }
}

/// Everything the router needs. Cloned into each handler.
#[derive(Clone)]
pub struct ServerConfig {
    pub credentials: Credentials,
    pub generator: Arc<dyn ReportGenerator>,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(credentials: Credentials, generator: Arc<dyn ReportGenerator>) -> Self {
        Self { credentials, generator, security: SecurityConfig::default() }
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// Configure allowed CORS origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = Some(timeout);
        self
    }
}
