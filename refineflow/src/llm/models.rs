//! Token limits per model and output budgeting per task.

/// Context window and output cap of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLimits {
    pub context_window: u32,
    pub max_output_tokens: u32,
}

const fn limits(context_window: u32, max_output_tokens: u32) -> ModelLimits {
    ModelLimits {
        context_window,
        max_output_tokens,
    }
}

const KNOWN_MODELS: &[(&str, ModelLimits)] = &[
    ("gpt-5-mini", limits(128_000, 65_536)),
    ("gpt-4-turbo", limits(128_000, 4_096)),
    ("gpt-4-32k", limits(32_768, 4_096)),
    ("gpt-4o-mini", limits(128_000, 16_384)),
    ("chatgpt-4o-latest", limits(128_000, 16_384)),
    ("gpt-4o", limits(128_000, 16_384)),
    ("gpt-4", limits(8_192, 4_096)),
    ("gpt-3.5-turbo", limits(16_385, 4_096)),
    ("o1-preview", limits(128_000, 32_768)),
    ("o1-mini", limits(128_000, 65_536)),
    ("o1", limits(200_000, 100_000)),
];

const DEFAULT_LIMITS: ModelLimits = limits(8_192, 4_096);

/// What a completion is used for; decides how much output to allow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Extraction,
    Chat,
    Jira,
    Canvas,
    Classification,
}

/// Exact name first, then the longest known name contained in `model`.
pub fn model_limits(model: &str) -> ModelLimits {
    let model = model.trim().to_lowercase();
    if let Some((_, found)) = KNOWN_MODELS.iter().find(|(name, _)| *name == model) {
        return *found;
    }
    KNOWN_MODELS
        .iter()
        .filter(|(name, _)| model.contains(name))
        .max_by_key(|(name, _)| name.len())
        .map(|(_, found)| *found)
        .unwrap_or(DEFAULT_LIMITS)
}

/// Reasoning models spend output tokens on hidden reasoning and reject
/// a custom temperature.
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.to_lowercase();
    ["o1", "o-1", "gpt-5"].iter().any(|tag| model.contains(tag))
}

fn output_ratio(task: TaskKind, reasoning: bool) -> f64 {
    match (task, reasoning) {
        (TaskKind::Extraction, true) => 0.5,
        (TaskKind::Chat, true) => 0.6,
        (TaskKind::Jira, true) => 0.7,
        (TaskKind::Canvas, true) => 0.8,
        (TaskKind::Classification, true) => 0.6,
        (TaskKind::Extraction, false) => 0.3,
        (TaskKind::Chat, false) => 0.5,
        (TaskKind::Jira, false) => 0.6,
        (TaskKind::Canvas, false) => 0.7,
        (TaskKind::Classification, false) => 0.5,
    }
}

pub fn max_output_tokens(model: &str, task: TaskKind) -> u32 {
    let ratio = output_ratio(task, is_reasoning_model(model));
    (f64::from(model_limits(model).max_output_tokens) * ratio) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        assert_eq!(model_limits("gpt-4"), limits(8_192, 4_096));
        assert_eq!(model_limits("gpt-5-mini"), limits(128_000, 65_536));
        assert_eq!(model_limits("o1"), limits(200_000, 100_000));
    }

    #[test]
    fn test_substring_lookup_prefers_longest_match() {
        assert_eq!(model_limits("gpt-4o-mini-2024-07-18"), limits(128_000, 16_384));
        assert_eq!(model_limits("gpt-4-turbo-preview"), limits(128_000, 4_096));
        assert_eq!(model_limits("o1-mini-2024"), limits(128_000, 65_536));
    }

    #[test]
    fn test_unknown_model_uses_default() {
        assert_eq!(model_limits("llama3"), DEFAULT_LIMITS);
    }

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("o1-preview"));
        assert!(!is_reasoning_model("gpt-4o"));
        assert!(!is_reasoning_model("gpt-3.5-turbo"));
    }

    #[test]
    fn test_max_output_tokens() {
        assert_eq!(max_output_tokens("gpt-5-mini", TaskKind::Extraction), 32_768);
        assert_eq!(max_output_tokens("gpt-5-mini", TaskKind::Canvas), 52_428);
        assert_eq!(max_output_tokens("gpt-4", TaskKind::Extraction), 1_228);
        assert_eq!(max_output_tokens("gpt-4", TaskKind::Jira), 2_457);
    }
}
