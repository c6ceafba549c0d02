//! Logging and metrics for Ferrule.
//!
//! - **Logging**: `tracing-subscriber` with an env filter and JSON or pretty
//!   output, see [`logging`]
//! - **Metrics**: request counters and latency histograms through the
//!   `metrics` facade, see [`metrics`]
//!
//! # Example
//!
//! ```rust,ignore
//! use ferrule_config::FerruleConfig;
//! use ferrule_telemetry::{init_logging, LogConfig};
//!
//! let config = FerruleConfig::production();
//! init_logging(&LogConfig::from(&config.logging))?;
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
