//! Typed configuration for Ferrule services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (unknown fields are rejected)
//! - Layered loading (defaults, then file, then environment)
//!
//! # Example
//!
//! ```no_run
//! use ferrule_config::ConfigLoader;
//!
//! # fn main() -> Result<(), ferrule_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("ferrule.toml")?
//!     .with_env_prefix("FERRULE")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 10485760
//! server_name = "Ferrule"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [binding]
//! sole_file_part_fallback = false
//! ```
//!
//! # Environment overrides
//!
//! Every value can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `FERRULE__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `FERRULE__LOGGING__FORMAT=pretty`
//! - `FERRULE__BINDING__SOLE_FILE_PART_FALLBACK=true`

#![doc(html_root_url = "https://docs.rs/ferrule-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{FerruleConfig, FerruleConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BindingSettings, LogFormat, LoggingSettings, ServerSettings};
