//! OpenAI-compatible chat completions client
//!
//! Talks to `POST {base_url}/chat/completions` with bearer auth. The API key
//! comes from the config file or the `OPENAI_API_KEY` environment variable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::models::{is_reasoning_model, max_output_tokens, TaskKind};
use crate::types::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("OpenAI not configured. Set OPENAI_API_KEY or llm.api_key in the config file")]
    NotConfigured,
    #[error("Authentication failed (401). Check OPENAI_API_KEY")]
    Unauthorized,
    #[error("Rate limited (429): {0}")]
    RateLimited(String),
    #[error("LLM API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("LLM returned an empty response")]
    EmptyResponse,
    #[error("LLM returned an unusable response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A prompt plus what it is for
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub task: TaskKind,
    pub messages: Vec<ChatMessage>,
    pub json_output: bool,
}

impl CompletionRequest {
    pub fn new(task: TaskKind, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            task,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            json_output: false,
        }
    }

    pub fn expect_json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Anything that can answer a chat completion request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_completion_tokens: max_output_tokens(&self.model, request.task),
            temperature: (!is_reasoning_model(&self.model)).then_some(self.temperature),
            response_format: request
                .json_output
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }

    fn map_http_error(&self, status: StatusCode, body: &str) -> LlmError {
        warn!(
            "LLM API error: HTTP {} from {}: {}",
            status.as_u16(),
            self.base_url,
            body
        );
        match status {
            StatusCode::UNAUTHORIZED => LlmError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited(body.to_string()),
            _ => LlmError::Api {
                status: status.as_u16(),
                message: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.body(request);
        debug!(
            model = %self.model,
            task = ?request.task,
            max_tokens = body.max_completion_tokens,
            "Sending chat completion"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(self.map_http_error(status, &text));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
