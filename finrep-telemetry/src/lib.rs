//! # finrep-telemetry
//!
//! Structured logging for finrep using `tracing`.
//!
//! ```rust
//! use finrep_telemetry::{info, init_telemetry};
//!
//! init_telemetry("my-service");
//! info!("ready");
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{DEFAULT_FILTER, init_json_telemetry, init_telemetry};
pub use spans::*;
