pub mod activity;
pub mod config;
pub mod enums;
pub mod state;

// Re-export commonly used types for convenience
pub use activity::{Activity, Entry, NewActivity};
pub use config::{AppConfig, LlmConfig, LoggingConfig, PathConfig, PathConfigType, StorageConfig};
pub use enums::{ActivityStatus, EntryType, ExportFormat, LogFormat};
pub use state::{ActivityState, CategorizedQuestions, Record, StateError};
