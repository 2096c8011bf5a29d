use std::env;
use std::path::{Path, PathBuf};

use crate::types::{PathConfig, PathConfigType};

pub const LOCAL_CONFIG_FILE: &str = "refineflow.config.yaml";
pub const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// `$XDG_CONFIG_HOME/refineflow`, else `~/.config/refineflow`
pub fn get_global_config_dir() -> PathBuf {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => dirs::home_dir()
            .map(|home| home.join(".config"))
            .unwrap_or_else(|| PathBuf::from(".config")),
    };
    base.join("refineflow")
}

pub fn get_global_config_path() -> PathBuf {
    get_global_config_dir().join(GLOBAL_CONFIG_FILE)
}

/// Walk up from `start_dir` (or the cwd) looking for `refineflow.config.yaml`.
pub fn find_local_config(start_dir: Option<&Path>) -> Option<PathBuf> {
    let start = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().ok()?,
    };

    start
        .ancestors()
        .map(|dir| dir.join(LOCAL_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Local config wins over the global one, even when the global one is missing.
pub fn resolve_paths() -> PathConfig {
    resolve_paths_from(None)
}

pub fn resolve_paths_from(start_dir: Option<&Path>) -> PathConfig {
    match find_local_config(start_dir) {
        Some(local) => PathConfig {
            config_type: PathConfigType::Local,
            config_path: local.to_string_lossy().to_string(),
        },
        None => PathConfig {
            config_type: PathConfigType::Global,
            config_path: get_global_config_path().to_string_lossy().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_local_config_in_start_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&config_path, "llm:\n  model: gpt-4o\n").unwrap();

        assert_eq!(find_local_config(Some(tmp.path())), Some(config_path));
    }

    #[test]
    fn test_find_local_config_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&config_path, "{}\n").unwrap();
        let nested = tmp.path().join("activities").join("login");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_config(Some(&nested)), Some(config_path));
    }

    #[test]
    fn test_find_local_config_ignores_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join(LOCAL_CONFIG_FILE)).unwrap();
        assert_eq!(find_local_config(Some(tmp.path())), None);
    }

    #[test]
    fn test_resolve_paths_prefers_local() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(LOCAL_CONFIG_FILE), "{}\n").unwrap();
        let paths = resolve_paths_from(Some(tmp.path()));
        assert_eq!(paths.config_type, PathConfigType::Local);
        assert!(paths.config_path.ends_with(LOCAL_CONFIG_FILE));
    }

    #[test]
    fn test_global_config_path() {
        let path = get_global_config_path();
        let path = path.to_string_lossy();
        assert!(path.contains("refineflow"));
        assert!(path.ends_with("config.yaml"));
    }
}
