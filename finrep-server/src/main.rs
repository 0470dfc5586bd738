use anyhow::Context;
use clap::Parser;
use finrep_server::{Credentials, ResearchReportGenerator, ServeArgs, ServerConfig, create_app};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = ServeArgs::parse();

    if args.json_logs {
        finrep_telemetry::init_json_telemetry("finrep-server");
    } else {
        finrep_telemetry::init_telemetry("finrep-server");
    }

    let credentials = Credentials::from_env();
    if !credentials.groq_api_key_set() {
        tracing::warn!(
            "GROQ_API_KEY is not set. The /generate endpoint will return an error until it is configured."
        );
    }

    let security = args.security_config();
    if security.allowed_origins.is_empty() {
        tracing::warn!("No CORS origins configured, allowing any origin");
    }

    let generator = Arc::new(ResearchReportGenerator::new(credentials.groq_api_key.clone()));
    let config = ServerConfig::new(credentials, generator).with_security(security);
    let app = create_app(config);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "finrep-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
