//! Runner configuration.
//!
//! The runner is launched by the editor with a single endpoint argument and
//! reads no configuration files or environment variables. Everything else
//! comes from in-code defaults, which tests and embedders may override.

use neige_rpc::Endpoint;
use strum::{Display, EnumString};
use thiserror::Error;

/// Default host extension module name.
pub const DEFAULT_EXTENSION: &str = "neige";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Supported logging output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

/// Resolved runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    endpoint: Endpoint,
    extension: String,
    log_filter: String,
    log_format: LogFormat,
}

impl RunnerConfig {
    /// Builds a configuration for the given host endpoint with defaults.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            extension: DEFAULT_EXTENSION.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::default(),
        }
    }

    /// Overrides the host extension module name.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Overrides the log filter expression.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Overrides the log format.
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Host endpoint to attach to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Name of the host extension module that receives callbacks.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks that the configuration can be used to build host scripts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidExtension`] when the extension name is
    /// empty or contains characters outside a plain Lua module path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = !self.extension.is_empty()
            && self
                .extension
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidExtension {
                name: self.extension.clone(),
            })
        }
    }
}

/// Errors raised by [`RunnerConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The extension name cannot be embedded in a `require` call.
    #[error("invalid host extension name '{name}'")]
    InvalidExtension {
        /// Rejected name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config() -> RunnerConfig {
        RunnerConfig::new(Endpoint::unix("/tmp/nvim.sock"))
    }

    #[rstest]
    fn defaults_target_neige_extension() {
        let config = config();
        assert_eq!(config.extension(), "neige");
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case("my_ext.runner")]
    #[case("neige-dev")]
    fn accepts_module_paths(#[case] name: &str) {
        assert!(config().with_extension(name).validate().is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("neige\")")]
    #[case("a b")]
    fn rejects_unsafe_names(#[case] name: &str) {
        assert_eq!(
            config().with_extension(name).validate(),
            Err(ConfigError::InvalidExtension {
                name: name.to_owned()
            })
        );
    }

    #[rstest]
    fn parses_log_format_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
