pub mod error;
pub mod loader;
pub mod paths;

pub use error::ConfigError;
pub use loader::{
    load_app_config, load_app_config_or_default, read_config, validate_config, write_config,
};
pub use paths::{find_local_config, resolve_paths};
