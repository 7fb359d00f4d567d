//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Directory the file tool writes into when nothing else is configured.
///
/// Matches the volume mount point used by the container image.
pub const DEFAULT_OUTPUT_DIR: &str = "/output";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Where persisted mind maps go.
    #[serde(default)]
    pub output: OutputConfig,

    /// Rendering engine invocation.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Parent directory for per-conversion workspaces.
    /// Default: the OS temporary directory.
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.command.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "engine command must not be empty".to_string(),
            });
        }

        if self.engine.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "engine timeout_secs must be greater than zero (use null to disable)"
                    .to_string(),
            });
        }

        if self.output.dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "output dir must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Output directory settings for the file tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory persisted mind maps are written to.
    /// Default: `/output`
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Directory shown to the user as the host-side location of `dir`.
    ///
    /// Purely cosmetic: when `dir` is a bind mount, this is where the file
    /// shows up outside the container. Defaults to `dir`.
    #[serde(default)]
    pub host_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            host_dir: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// Rendering engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Program to execute.
    /// Default: `markmap`
    #[serde(default = "default_engine_command")]
    pub command: String,

    /// Arguments placed before the conversion flags, e.g. `["markmap-cli"]`
    /// when `command` is `npx`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Seconds to wait for the engine before killing it. `null` waits forever.
    /// Default: 120
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

impl EngineConfig {
    /// Returns the engine timeout as a [`Duration`], if one is set.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            args: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_engine_command() -> String {
    "markmap".to_string()
}

#[allow(clippy::unnecessary_wraps)] // serde default must match the field type
const fn default_timeout_secs() -> Option<u64> {
    Some(120)
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Default: "warn"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.dir, PathBuf::from("/output"));
        assert!(config.output.host_dir.is_none());
        assert_eq!(config.engine.command, "markmap");
        assert!(config.engine.args.is_empty());
        assert_eq!(config.engine.timeout_secs, Some(120));
        assert!(config.workspace_dir.is_none());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "output": {
                "dir": "/srv/mindmaps",
                "host_dir": "/Users/someone/Downloads"
            },
            "engine": {
                "command": "npx",
                "args": ["markmap-cli"],
                "timeout_secs": 30
            },
            "workspace_dir": "/var/tmp",
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.dir, PathBuf::from("/srv/mindmaps"));
        assert_eq!(
            config.output.host_dir,
            Some(PathBuf::from("/Users/someone/Downloads"))
        );
        assert_eq!(config.engine.command, "npx");
        assert_eq!(config.engine.args, vec!["markmap-cli".to_string()]);
        assert_eq!(config.engine.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.workspace_dir, Some(PathBuf::from("/var/tmp")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn null_timeout_disables_it() {
        let json = r#"{ "engine": { "timeout_secs": null } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.engine.timeout().is_none());
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{ "engine": { "timeout_secs": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_empty_engine_command() {
        let json = r#"{ "engine": { "command": "  " } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
