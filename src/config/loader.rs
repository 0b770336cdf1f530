//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::env::{apply_env_overrides, process_env};
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Environment error in {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A validated configuration plus the warnings collected on the way.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: GatewayConfig,
    pub warnings: Vec<String>,
}

/// Parse a TOML file into a config (no overlay, no validation).
pub fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load the optional file, apply `lookup` as environment, validate.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => GatewayConfig::default(),
    };

    let warnings = apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, warnings })
}

/// Load and validate configuration from an optional TOML file and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_with(path, process_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [redirects]
            rules = [{{ selector = "alice", destination = "/superset/dashboard/3/" }}]
            "#
        )
        .unwrap();

        let loaded = load_config_with(Some(file.path()), |key| {
            (key == "SUPERSET_DEFAULT_HOME_PAGE").then(|| "/superset/dashboard/list/".to_string())
        })
        .unwrap();

        assert_eq!(loaded.config.redirects.rules.len(), 1);
        assert_eq!(loaded.config.redirects.default_home_page, "/superset/dashboard/list/");
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config_with(Some(Path::new("/definitely/not/here.toml")), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = ").unwrap();
        let err = load_config_with(Some(file.path()), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_malformed_env_json_still_loads() {
        let loaded = load_config_with(None, |key| {
            (key == "SUPERSET_USER_DASHBOARD_REDIRECTS").then(|| "{not json".to_string())
        })
        .unwrap();
        assert!(loaded.config.redirects.rules.is_empty());
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn test_blank_env_entries_do_not_block_startup() {
        let loaded = load_config_with(None, |key| {
            (key == "SUPERSET_USER_DASHBOARD_REDIRECTS").then(|| r#"{"alice": "", "": "/d/7/"}"#.to_string())
        })
        .unwrap();
        assert!(loaded.config.redirects.rules.is_empty());
        assert_eq!(loaded.warnings.len(), 2);
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = load_config_with(None, |key| {
            (key == "GATEWAY_UPSTREAM_URL").then(|| "not a url".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("upstream.url"));
    }
}
