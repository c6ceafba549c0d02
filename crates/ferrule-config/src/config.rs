//! Top-level configuration.
//!
//! This module provides [`FerruleConfig`] and its builder.

use serde::{Deserialize, Serialize};

use crate::{BindingSettings, ConfigError, LogFormat, LoggingSettings, ServerSettings};

/// Complete configuration of a Ferrule service.
///
/// # Example
///
/// ```
/// use ferrule_config::FerruleConfig;
///
/// let config = FerruleConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct FerruleConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Argument binding settings.
    #[serde(default)]
    pub binding: BindingSettings,
}

impl FerruleConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> FerruleConfigBuilder {
        FerruleConfigBuilder::new()
    }

    /// Checks values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        // Sent verbatim as a header value
        let name = &self.server.server_name;
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(ConfigError::invalid_value(
                "server.server_name",
                "must be non-empty printable ASCII",
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        Ok(())
    }

    /// Human-readable debug logging.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config.logging.span_events = true;
        config
    }

    /// JSON logging at `info`.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}

/// Builder for [`FerruleConfig`].
#[derive(Debug, Default)]
pub struct FerruleConfigBuilder {
    server: Option<ServerSettings>,
    logging: Option<LoggingSettings>,
    binding: Option<BindingSettings>,
}

impl FerruleConfigBuilder {
    /// Creates a builder where every section takes its defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server section.
    #[must_use]
    pub fn server(mut self, server: ServerSettings) -> Self {
        self.server = Some(server);
        self
    }

    /// Sets the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Sets the binding section.
    #[must_use]
    pub fn binding(mut self, binding: BindingSettings) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Builds the configuration without validating it.
    #[must_use]
    pub fn build(self) -> FerruleConfig {
        FerruleConfig {
            server: self.server.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            binding: self.binding.unwrap_or_default(),
        }
    }

    /// Builds and validates the configuration.
    pub fn build_validated(self) -> Result<FerruleConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
