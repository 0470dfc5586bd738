//! Telemetry initialization and configuration

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize console logging.
///
/// Safe to call more than once; only the first call installs a subscriber.
///
/// # Example
/// ```
/// use finrep_telemetry::init_telemetry;
/// init_telemetry("finrep-server");
/// ```
pub fn init_telemetry(service_name: &str) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .try_init();

        if installed.is_ok() {
            tracing::info!(service.name = service_name, "Telemetry initialized");
        }
    });
}

/// Initialize logging with one JSON object per line, for log shippers.
pub fn init_json_telemetry(service_name: &str) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init();

        if installed.is_ok() {
            tracing::info!(service.name = service_name, "Telemetry initialized (json)");
        }
    });
}
