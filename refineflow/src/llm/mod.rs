pub mod client;
pub mod models;
pub mod processor;
pub mod prompts;

pub use client::{ChatBackend, CompletionRequest, LlmError, OpenAiClient};
pub use models::TaskKind;
pub use processor::LlmProcessor;
