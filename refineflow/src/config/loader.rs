use std::env;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::error::ConfigError;
use super::paths::resolve_paths;
use crate::types::{AppConfig, LogFormat};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Read and parse a YAML config file. An empty file yields the defaults.
pub fn read_config(path: &str) -> Result<AppConfig, ConfigError> {
    let file = Path::new(path);
    if !file.exists() {
        return Err(ConfigError::NotFound(path.to_string()));
    }
    if file.is_dir() {
        return Err(ConfigError::InvalidPath(format!("{path} is a directory")));
    }

    let content = fs::read_to_string(file)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Environment variables override file values when set and non-empty.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = var("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(model) = var("OPENAI_MODEL") {
        config.llm.model = model;
    }
    if let Some(base_url) = var("REFINEFLOW_LLM_BASE_URL") {
        config.llm.base_url = base_url;
    }
    if let Some(data_dir) = var("REFINEFLOW_DATA_DIR") {
        config.storage.data_dir = data_dir;
    }
    if let Some(level) = var("REFINEFLOW_LOG_LEVEL") {
        config.logging.level = level.to_lowercase();
    }
    if let Some(format) = var("REFINEFLOW_LOG_FORMAT") {
        match format.parse::<LogFormat>() {
            Ok(parsed) => config.logging.format = parsed,
            Err(e) => debug!("Ignoring REFINEFLOW_LOG_FORMAT: {}", e),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if config.llm.model.trim().is_empty() {
        problems.push("llm.model must not be empty".to_string());
    }
    if !(config.llm.base_url.starts_with("http://") || config.llm.base_url.starts_with("https://"))
    {
        problems.push(format!(
            "llm.base_url must be an http(s) URL, got '{}'",
            config.llm.base_url
        ));
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        problems.push(format!(
            "llm.temperature must be between 0 and 2, got {}",
            config.llm.temperature
        ));
    }
    if config.llm.timeout_seconds == 0 {
        problems.push("llm.timeout_seconds must be greater than 0".to_string());
    }
    if config.storage.data_dir.trim().is_empty() {
        problems.push("storage.data_dir must not be empty".to_string());
    }
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        problems.push(format!(
            "logging.level must be one of {}, got '{}'",
            LOG_LEVELS.join(", "),
            config.logging.level
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(problems))
    }
}

pub fn write_config(path: &str, config: &AppConfig) -> Result<(), ConfigError> {
    let file = Path::new(path);
    let parent = file
        .parent()
        .ok_or_else(|| ConfigError::InvalidPath(path.to_string()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, serde_yaml::to_string(config)?)?;
    Ok(())
}

/// Resolve the effective configuration for a run.
///
/// Order, weakest first: defaults, config file, environment, CLI flags.
/// A missing config file at the resolved location is fine; an explicitly
/// requested one must exist.
pub fn load_app_config(
    config_override: Option<&Path>,
    data_dir_override: Option<&Path>,
    model_override: Option<&str>,
) -> Result<AppConfig, ConfigError> {
    let mut config = match config_override {
        Some(path) => read_config(&path.to_string_lossy())?,
        None => {
            let paths = resolve_paths();
            match read_config(&paths.config_path) {
                Ok(config) => {
                    debug!(path = %paths.config_path, "Loaded config");
                    config
                }
                Err(ConfigError::NotFound(_)) => AppConfig::default(),
                Err(e) => return Err(e),
            }
        }
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok());

    if let Some(dir) = data_dir_override {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(model) = model_override {
        config.llm.model = model.to_string();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Like [`load_app_config`], but a config that cannot be loaded yields the
/// defaults (plus the CLI flags) together with the error. For the commands
/// that diagnose or repair a broken config.
pub fn load_app_config_or_default(
    config_override: Option<&Path>,
    data_dir_override: Option<&Path>,
    model_override: Option<&str>,
) -> (AppConfig, Option<ConfigError>) {
    match load_app_config(config_override, data_dir_override, model_override) {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = AppConfig::default();
            if let Some(dir) = data_dir_override {
                config.storage.data_dir = dir.to_string_lossy().to_string();
            }
            if let Some(model) = model_override {
                config.llm.model = model.to_string();
            }
            (config, Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write(dir: &Path, content: &str) -> String {
        let path = dir.join("refineflow.config.yaml");
        fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_read_config_missing_file() {
        let result = read_config("/nonexistent/refineflow.config.yaml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_read_config_partial_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "llm:\n  model: gpt-4o\nlogging:\n  format: json\n");
        let config = read_config(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_read_config_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "\n");
        let config = read_config(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-5-mini");
    }

    #[test]
    fn test_read_config_invalid_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "llm: [unclosed\n");
        assert!(matches!(read_config(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("REFINEFLOW_DATA_DIR", "/srv/refineflow"),
            ("REFINEFLOW_LOG_LEVEL", "DEBUG"),
            ("REFINEFLOW_LOG_FORMAT", "json"),
            ("REFINEFLOW_LLM_BASE_URL", "   "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.storage.data_dir, "/srv/refineflow");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_config_collects_problems() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());

        config.llm.temperature = 3.0;
        config.llm.base_url = "ftp://example".into();
        config.logging.level = "loud".into();
        match validate_config(&config) {
            Err(ConfigError::ValidationError(problems)) => assert_eq!(problems.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_then_read_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let path = path.to_string_lossy().to_string();

        let mut config = AppConfig::default();
        config.llm.model = "o1-mini".into();
        write_config(&path, &config).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("api_key"));
        assert_eq!(read_config(&path).unwrap().llm.model, "o1-mini");
    }

    #[test]
    fn test_load_app_config_flags_win() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "llm:\n  model: gpt-4\nstorage:\n  data_dir: ./file-dir\n");
        let data_dir = tmp.path().join("flag-dir");

        let config =
            load_app_config(Some(Path::new(&path)), Some(&data_dir), Some("gpt-4o")).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.storage.data_dir, data_dir.to_string_lossy());
    }

    #[test]
    fn test_load_app_config_explicit_missing_file() {
        let result = load_app_config(Some(Path::new("/nonexistent/config.yaml")), None, None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_survives_broken_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "llm: [unclosed\n");
        let data_dir = tmp.path().join("data");

        let (config, error) =
            load_app_config_or_default(Some(Path::new(&path)), Some(&data_dir), None);
        assert!(matches!(error, Some(ConfigError::ParseError(_))));
        assert_eq!(config.llm.model, "gpt-5-mini");
        assert_eq!(config.storage.data_dir, data_dir.to_string_lossy());
    }

    #[test]
    fn test_load_or_default_passes_good_config_through() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "llm:\n  model: gpt-4\n");
        let (config, error) = load_app_config_or_default(Some(Path::new(&path)), None, None);
        assert!(error.is_none());
        assert_eq!(config.llm.model, "gpt-4");
    }
}
