//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod converter;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::converter::ConverterConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Prefix for environment-variable overrides (`FILEFORGE__SERVER__PORT=9000`).
pub const ENV_PREFIX: &str = "FILEFORGE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Conversion pipeline settings.
    #[validate(nested)]
    pub converter: ConverterConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `<config_dir>/default.toml` with `<config_dir>/<env>.toml` and
    /// environment variables prefixed with `FILEFORGE__`. Missing files are
    /// not an error; every field has a default.
    pub fn load(config_dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_file = config_dir.join("default");
        let env_file = config_dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load(dir.path(), "test").expect("load");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.converter.conversion_timeout_seconds, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overlay_overrides_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n[converter]\noffice_binary = \"soffice\"\n",
        )
        .expect("write default");
        std::fs::write(
            dir.path().join("staging.toml"),
            "[converter]\noffice_binary = \"/opt/libreoffice/program/soffice\"\n",
        )
        .expect("write overlay");

        let config = AppConfig::load(dir.path(), "staging").expect("load");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.converter.office_binary,
            "/opt/libreoffice/program/soffice"
        );
    }

    #[test]
    fn test_out_of_range_timeout_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[converter]\nconversion_timeout_seconds = 0\n",
        )
        .expect("write default");

        let err = AppConfig::load(dir.path(), "test").expect_err("must fail validation");
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
