//! # finrep-server
//!
//! HTTP front end for the financial research agent.
//!
//! - `GET /` serves the report page
//! - `POST /generate` turns `{"query": ...}` into a markdown report
//! - `GET /health` reports liveness and which credentials are configured
//!
//! Handlers never read the environment. Credentials and the report generator are injected
//! through [`ServerConfig`], which makes the router testable without network access:
//!
//! ```rust,ignore
//! let config = ServerConfig::new(
//!     Credentials::from_env(),
//!     Arc::new(ResearchReportGenerator::new(Credentials::from_env().groq_api_key)),
//! );
//! let app = create_app(config);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod rest;
pub mod web_ui;

pub use cli::ServeArgs;
pub use config::{Credentials, SecurityConfig, ServerConfig};
pub use error::ApiError;
pub use generator::{ReportGenerator, ResearchReportGenerator};
pub use rest::create_app;
pub use rest::controllers::health::HealthResponse;
pub use rest::controllers::report::{GenerateRequest, GenerateResponse};
