//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{RouteError, Router};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load a configuration file and build its compiled route table.
pub fn load_router(path: &Path) -> Result<(AppConfig, Router), ConfigError> {
    let config = load_config(path)?;
    let router = Router::from_config(&config)?;
    Ok((config, router))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_router_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:0"

            [[routes]]
            uri = "users/{{id}}"
            name = "users.show"
            "#
        )
        .unwrap();

        let (config, router) = load_router(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:0");
        assert!(router.routes().has_named_route("users.show"));
        assert!(router.routes().get_by_name("users.show").unwrap().is_compiled());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/routes.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("[[routes]"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[[routes]]\nuri = \"\"\n").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: routes[0]: uri must not be empty");
    }

    #[test]
    fn test_route_compile_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[routes]]\nuri = \"a/{{x}}/{{x}}\"\n").unwrap();
        let err = load_router(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Route(RouteError::DuplicateVariable { .. })));
    }
}
