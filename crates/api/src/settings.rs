//! Service Configuration
//!
//! Layered: built-in defaults, then an optional config file, then
//! `ADMISSIONS__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use inference_engine::ArtifactPaths;
use serde::{Deserialize, Serialize};

/// Config file looked up when `ADMISSIONS_CONFIG` is unset (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config/admissions";

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub artifacts: ArtifactPaths,
    pub logging: LoggingSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `api=debug,tower_http=info`
    pub level: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load from `ADMISSIONS_CONFIG` (or the default path) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("ADMISSIONS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load with an explicit config file path; a missing file is not an error
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("ADMISSIONS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let settings = Settings::load_from(path.to_str().unwrap()).unwrap();

        assert_eq!(settings.server.bind_addr, "0.0.0.0:8000");
        assert_eq!(settings.artifacts, ArtifactPaths::default());
        assert_eq!(settings.logging, LoggingSettings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admissions.toml");
        fs::write(
            &path,
            r#"
[server]
bind_addr = "127.0.0.1:9100"

[artifacts]
model_path = "/srv/models/admissions.onnx"

[logging]
json = true
"#,
        )
        .unwrap();

        let settings = Settings::load_from(path.to_str().unwrap()).unwrap();

        assert_eq!(settings.server.bind_addr, "127.0.0.1:9100");
        assert_eq!(
            settings.artifacts.model_path,
            PathBuf::from("/srv/models/admissions.onnx")
        );
        assert_eq!(
            settings.artifacts.feature_columns_path,
            PathBuf::from("artifacts/feature_columns.json")
        );
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
    }
}
