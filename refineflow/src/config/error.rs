use std::fmt;

/// Failures while locating, reading or checking a config file
#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    /// YAML syntax or shape error
    ParseError(String),
    IoError(std::io::Error),
    ValidationError(Vec<String>),
    InvalidPath(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "No refineflow config at {path} (run 'refineflow config --edit')")
            }
            ConfigError::ParseError(msg) => write!(f, "Invalid YAML in config: {msg}"),
            ConfigError::IoError(err) => write!(f, "Could not access config: {err}"),
            ConfigError::ValidationError(problems) => {
                write!(f, "Config has {} problem(s):", problems.len())?;
                for problem in problems {
                    write!(f, "\n  - {problem}")?;
                }
                Ok(())
            }
            ConfigError::InvalidPath(msg) => write!(f, "Invalid config path: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
