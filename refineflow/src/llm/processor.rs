use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::client::{ChatBackend, CompletionRequest, LlmError, OpenAiClient};
use super::models::TaskKind;
use super::prompts;
use crate::timestamp;
use crate::types::{Activity, ActivityState, Entry, EntryType, LlmConfig};

/// How much of the log the chat prompt sees
const CHAT_LOG_CHARS: usize = 2000;

/// Runs the LLM-backed refinement tasks. Without a backend every task
/// either reports `NotConfigured` or degrades to a deterministic output.
pub struct LlmProcessor {
    backend: Option<Box<dyn ChatBackend>>,
}

impl LlmProcessor {
    pub fn new(config: &LlmConfig) -> Self {
        let backend = match OpenAiClient::from_config(config) {
            Ok(client) => Some(Box::new(client) as Box<dyn ChatBackend>),
            Err(LlmError::NotConfigured) => {
                debug!("No API key configured, LLM features disabled");
                None
            }
            Err(e) => {
                warn!("Failed to build LLM client: {}", e);
                None
            }
        };
        Self { backend }
    }

    pub fn with_backend(backend: Box<dyn ChatBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.model())
    }

    fn backend(&self) -> Result<&dyn ChatBackend, LlmError> {
        self.backend.as_deref().ok_or(LlmError::NotConfigured)
    }

    pub async fn extract_state(
        &self,
        activity: &Activity,
        entry: &Entry,
        current: &ActivityState,
    ) -> Result<ActivityState, LlmError> {
        let request = CompletionRequest::new(
            TaskKind::Extraction,
            prompts::EXTRACTION_SYSTEM,
            prompts::extraction_user(activity, entry.entry_type, &entry.content, current),
        )
        .expect_json();

        let raw = self.backend()?.complete(&request).await?;
        debug!(chars = raw.len(), "Extraction response received");

        let mut candidate = parse_state_response(&raw)?;
        candidate.last_updated = timestamp::now();
        Ok(candidate)
    }

    /// Extract a candidate state from `entry` and merge it into `current`.
    /// `None` means nothing should be persisted.
    pub async fn process_entry(
        &self,
        activity: &Activity,
        entry: &Entry,
        current: &ActivityState,
    ) -> Option<ActivityState> {
        if !self.is_available() {
            warn!("OpenAI not available, skipping state extraction");
            return None;
        }
        match self.extract_state(activity, entry, current).await {
            Ok(candidate) => {
                info!(slug = %activity.slug, "Extracted and merged activity state");
                Some(current.merge_with(&candidate))
            }
            Err(e) => {
                error!(slug = %activity.slug, "State extraction failed: {}", e);
                None
            }
        }
    }

    pub async fn classify_entry_type(&self, content: &str) -> Result<EntryType, LlmError> {
        #[derive(Deserialize)]
        struct Classification {
            entry_type: String,
        }

        let request = CompletionRequest::new(
            TaskKind::Classification,
            prompts::CLASSIFICATION_SYSTEM,
            content,
        )
        .expect_json();
        let raw = self.backend()?.complete(&request).await?;

        let parsed: Classification = serde_json::from_str(strip_code_fences(&raw))
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        parsed
            .entry_type
            .parse()
            .map_err(LlmError::InvalidResponse)
    }

    pub async fn answer_question(
        &self,
        activity: &Activity,
        state: &ActivityState,
        log: &str,
        question: &str,
    ) -> String {
        let Ok(backend) = self.backend() else {
            return "OpenAI não está configurado. Não é possível responder perguntas.".into();
        };

        let request = CompletionRequest::new(
            TaskKind::Chat,
            prompts::CHAT_SYSTEM,
            prompts::chat_user(activity, state, tail_chars(log, CHAT_LOG_CHARS), question),
        );
        match backend.complete(&request).await {
            Ok(answer) => {
                info!(chars = answer.len(), "Generated answer");
                answer
            }
            Err(LlmError::EmptyResponse) => {
                warn!("Empty answer received from chat completion");
                "Não foi possível gerar uma resposta. Por favor, tente novamente.".into()
            }
            Err(e) => {
                error!("Failed to answer question: {}", e);
                format!("Erro ao processar pergunta: {e}")
            }
        }
    }

    /// Jira markdown body for the activity. Falls back to a fixed template
    /// when the LLM is unavailable or fails.
    pub async fn generate_jira(&self, activity: &Activity, state: &ActivityState) -> String {
        let Ok(backend) = self.backend() else {
            return jira_fallback(activity, state);
        };
        let request = CompletionRequest::new(
            TaskKind::Jira,
            prompts::JIRA_SYSTEM,
            prompts::jira_user(activity, state),
        );
        match backend.complete(&request).await {
            Ok(content) => {
                info!(chars = content.len(), "Generated Jira export");
                content
            }
            Err(e) => {
                error!("Failed to generate Jira export: {}", e);
                jira_fallback(activity, state)
            }
        }
    }

    pub async fn generate_canvas(
        &self,
        activity: &Activity,
        state: &ActivityState,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(
            TaskKind::Canvas,
            prompts::CANVAS_SYSTEM,
            prompts::canvas_user(activity, state),
        );
        let content = self.backend()?.complete(&request).await?;
        info!(chars = content.len(), "Generated canvas");
        Ok(content)
    }
}

/// Parse an extraction reply into a candidate state.
pub fn parse_state_response(raw: &str) -> Result<ActivityState, LlmError> {
    let mut value: Value = serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| LlmError::InvalidResponse(format!("not JSON: {e}")))?;

    let Value::Object(fields) = &mut value else {
        return Err(LlmError::InvalidResponse("expected a JSON object".into()));
    };
    if let Some(costs) = fields.remove("cost_estimates") {
        fields.insert("costs".into(), costs);
    }

    serde_json::from_value(value).map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json)
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    match text.char_indices().nth(count - max) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

fn jira_fallback(activity: &Activity, state: &ActivityState) -> String {
    format!(
        "## Tarefa Pai: {title}\n\n\
         **Descrição**: {description}\n\n\
         {summary}\n\n\
         **Critérios de Aceitação**:\n\
         - Todos os requisitos funcionais atendidos\n\
         - Todos os testes passando\n\n\
         ## Subtarefa Backend\n\n\
         **Título**: [BE] {title}\n\n\
         **Descrição**: Implementar componentes de backend\n\n\
         ## Subtarefa Frontend\n\n\
         **Título**: [FE] {title}\n\n\
         **Descrição**: Implementar componentes de frontend\n",
        title = activity.title,
        description = activity.description,
        summary = state.summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct FakeBackend {
        reply: Result<String, u16>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeBackend {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "boom".into(),
                }),
            }
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    fn activity() -> Activity {
        Activity {
            slug: "login".into(),
            title: "Login".into(),
            description: "Autenticação".into(),
            status: Default::default(),
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
            metadata: BTreeMap::new(),
            problem: String::new(),
            stakeholders: Vec::new(),
            constraints: String::new(),
            affected_system: String::new(),
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_state_response_maps_costs_and_questions() {
        let raw = r#"```json
{"summary": "S", "cost_estimates": [{"item": "infra", "amount": 100}],
 "open_questions": ["Qual provedor?"]}
```"#;
        let state = parse_state_response(raw).unwrap();
        assert_eq!(state.summary, "S");
        assert_eq!(
            state.costs,
            vec![Record::new().with("item", "infra").with("amount", "100")]
        );
        assert_eq!(state.open_questions["Geral"], vec!["Qual provedor?"]);
    }

    #[test]
    fn test_parse_state_response_rejects_garbage() {
        assert!(matches!(
            parse_state_response("not json"),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_state_response("[1, 2]"),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_state_response(r#"{"open_questions": 5}"#),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_tail_chars_respects_char_boundaries() {
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(tail_chars("ãéíõú", 2), "õú");
    }

    #[tokio::test]
    async fn test_process_entry_merges_into_current() {
        let backend = FakeBackend::replying(
            r#"{"summary": "", "functional_requirements": ["Login com email", "Logout"]}"#,
        );
        let processor = LlmProcessor::with_backend(Box::new(backend));
        let mut current = ActivityState::empty("Resumo", "2024-01-01T00:00:00+00:00");
        current.functional_requirements = vec!["login com EMAIL".into()];

        let entry = Entry::new(EntryType::Requirement, "Precisa de login e logout");
        let merged = processor
            .process_entry(&activity(), &entry, &current)
            .await
            .unwrap();
        assert_eq!(merged.summary, "Resumo");
        assert_eq!(
            merged.functional_requirements,
            vec!["login com EMAIL".to_string(), "Logout".to_string()]
        );
        assert_ne!(merged.last_updated, current.last_updated);
    }

    #[tokio::test]
    async fn test_process_entry_sends_json_extraction_request() {
        let backend = std::sync::Arc::new(FakeBackend::replying("{}"));
        struct Shared(std::sync::Arc<FakeBackend>);
        #[async_trait]
        impl ChatBackend for Shared {
            async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
                self.0.complete(request).await
            }
            fn model(&self) -> &str {
                self.0.model()
            }
        }
        let processor = LlmProcessor::with_backend(Box::new(Shared(backend.clone())));
        let current = ActivityState::default();
        let entry = Entry::new(EntryType::Note, "conteúdo");
        processor.process_entry(&activity(), &entry, &current).await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].task, TaskKind::Extraction);
        assert!(seen[0].json_output);
        assert!(seen[0].messages[1].content.contains("conteúdo"));
    }

    #[tokio::test]
    async fn test_process_entry_returns_none_on_failure() {
        let processor = LlmProcessor::with_backend(Box::new(FakeBackend::failing(500)));
        let entry = Entry::new(EntryType::Note, "x");
        let result = processor
            .process_entry(&activity(), &entry, &ActivityState::default())
            .await;
        assert!(result.is_none());

        let unavailable = LlmProcessor::unavailable();
        assert!(unavailable
            .process_entry(&activity(), &entry, &ActivityState::default())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_classify_entry_type() {
        let processor =
            LlmProcessor::with_backend(Box::new(FakeBackend::replying(r#"{"entry_type": "risk"}"#)));
        assert_eq!(
            processor.classify_entry_type("pode falhar").await.unwrap(),
            EntryType::Risk
        );

        let processor =
            LlmProcessor::with_backend(Box::new(FakeBackend::replying(r#"{"entry_type": "idea"}"#)));
        assert!(matches!(
            processor.classify_entry_type("x").await,
            Err(LlmError::InvalidResponse(_))
        ));

        assert!(matches!(
            LlmProcessor::unavailable().classify_entry_type("x").await,
            Err(LlmError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_answer_question_reports_failures_as_text() {
        let state = ActivityState::default();
        let answer = LlmProcessor::unavailable()
            .answer_question(&activity(), &state, "", "?")
            .await;
        assert!(answer.contains("não está configurado"));

        let failing = LlmProcessor::with_backend(Box::new(FakeBackend::failing(500)));
        let answer = failing.answer_question(&activity(), &state, "", "?").await;
        assert!(answer.starts_with("Erro ao processar pergunta"));

        let ok = LlmProcessor::with_backend(Box::new(FakeBackend::replying("Use OAuth2")));
        assert_eq!(
            ok.answer_question(&activity(), &state, "log", "Qual auth?").await,
            "Use OAuth2"
        );
    }

    #[tokio::test]
    async fn test_generate_jira_falls_back_to_template() {
        let state = ActivityState::empty("Resumo", "t");
        for processor in [
            LlmProcessor::unavailable(),
            LlmProcessor::with_backend(Box::new(FakeBackend::failing(429))),
        ] {
            let content = processor.generate_jira(&activity(), &state).await;
            assert!(content.starts_with("## Tarefa Pai: Login"));
            assert!(content.contains("## Subtarefa Backend"));
            assert!(content.contains("[FE] Login"));
        }
    }

    #[tokio::test]
    async fn test_generate_canvas_requires_backend() {
        let state = ActivityState::default();
        assert!(matches!(
            LlmProcessor::unavailable()
                .generate_canvas(&activity(), &state)
                .await,
            Err(LlmError::NotConfigured)
        ));
        let processor = LlmProcessor::with_backend(Box::new(FakeBackend::replying("# Canvas")));
        assert_eq!(
            processor.generate_canvas(&activity(), &state).await.unwrap(),
            "# Canvas"
        );
    }
}
