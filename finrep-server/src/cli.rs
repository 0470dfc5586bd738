use crate::config::{DEFAULT_MAX_BODY_SIZE, SecurityConfig};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "finrep-server")]
#[command(about = "Serve markdown financial research reports over HTTP", long_about = None)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Abort requests that run longer than this many seconds (off by default)
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_BODY_SIZE", default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// Comma-separated CORS origins; empty allows any origin
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl ServeArgs {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn security_config(&self) -> SecurityConfig {
        SecurityConfig {
            allowed_origins: self
                .allowed_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            max_body_size: self.max_body_size,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}
