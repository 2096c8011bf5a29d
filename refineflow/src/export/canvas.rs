//! Business Case Canvas rendering.
//!
//! The LLM writes the canvas when one is configured. Otherwise the canvas is
//! filled in from the structured state with a fixed pt-BR template.

use serde_json::Value;
use tracing::{error, info};

use crate::llm::{LlmError, LlmProcessor};
use crate::types::{Activity, ActivityState, Record};

const NOT_SPECIFIED: &str = "_Not specified_";
const NOT_ESTIMATED: &str = "_Not estimated_";
const MAX_GAP_QUESTIONS: usize = 3;

pub struct CanvasExporter;

impl CanvasExporter {
    pub async fn render(
        activity: &Activity,
        state: &ActivityState,
        processor: &LlmProcessor,
    ) -> String {
        match processor.generate_canvas(activity, state).await {
            Ok(canvas) => canvas,
            Err(LlmError::NotConfigured) => {
                info!(slug = %activity.slug, "LLM not configured, using canvas template");
                Self::fallback(activity, state)
            }
            Err(e) => {
                error!(slug = %activity.slug, "Failed to generate canvas: {}", e);
                Self::fallback(activity, state)
            }
        }
    }

    pub fn fallback(activity: &Activity, state: &ActivityState) -> String {
        let canvas = CanvasFields(&state.canvas);

        let problem_statement = canvas
            .text("problem_statement")
            .unwrap_or_else(|| or_placeholder(&activity.problem, NOT_SPECIFIED));
        let proposed_solution = canvas
            .text("proposed_solution")
            .unwrap_or_else(|| or_placeholder(&state.summary, NOT_SPECIFIED));
        let in_scope: Vec<String> = state
            .functional_requirements
            .iter()
            .chain(&state.non_functional_requirements)
            .cloned()
            .collect();

        let sections = [
            format!("# Business Case Canvas: {}", activity.title),
            "## Problema".to_string(),
            format!("**Qual é o problema?**\n{problem_statement}"),
            format!(
                "**Quem tem o problema?**\n{}",
                or_placeholder(&activity.stakeholders.join(", "), NOT_SPECIFIED)
            ),
            format!(
                "**Por que é importante?**\n{}",
                canvas.text_or("problem_importance", NOT_SPECIFIED)
            ),
            "## Solução".to_string(),
            format!("**Solução Proposta:**\n{proposed_solution}"),
            format!(
                "**Como se relaciona com o problema?**\n{}",
                canvas.text_or("solution_relation", NOT_SPECIFIED)
            ),
            "## Recursos".to_string(),
            format!(
                "**Recursos Tangíveis:**\n{}",
                format_list(&canvas.list("tangible_resources"))
            ),
            format!(
                "**Recursos Intangíveis:**\n{}",
                format_list(&canvas.list("intangible_resources"))
            ),
            format!(
                "**Dependências Internas:**\n{}",
                format_list(&dependencies_of_type(&state.dependencies, "internal"))
            ),
            format!(
                "**Dependências Externas:**\n{}",
                format_list(&dependencies_of_type(&state.dependencies, "external"))
            ),
            "## Benefícios".to_string(),
            format!(
                "**Propósito (Por que estamos fazendo isso?):**\n{}",
                canvas.text_or("purpose", NOT_SPECIFIED)
            ),
            format!("**Objetivos:**\n{}", format_list(&canvas.list("goals"))),
            format!(
                "**Benefícios Financeiros:**\n{}",
                format_list(&canvas.list("financial_benefits"))
            ),
            format!(
                "**Benefícios Não-Financeiros:**\n{}",
                format_list(&canvas.list("non_financial_benefits"))
            ),
            "## Escopo".to_string(),
            format!("**Dentro do Escopo:**\n{}", format_list(&in_scope)),
            format!(
                "**Fora do Escopo:**\n{}",
                format_list(&canvas.list("out_of_scope"))
            ),
            format!(
                "**Cronograma:**\n{}",
                or_placeholder(&activity.constraints, NOT_SPECIFIED)
            ),
            format!(
                "**Recursos Disponíveis:**\n{}",
                canvas.text_or("resources_available", NOT_SPECIFIED)
            ),
            format!(
                "**Relevância Estratégica:**\n{}",
                canvas.text_or("strategic_relevance", NOT_SPECIFIED)
            ),
            "## Riscos".to_string(),
            format_risks(&state.identified_risks),
            "## Stakeholders".to_string(),
            format_list(&activity.stakeholders),
            "## Análise de Complexidade".to_string(),
            format!(
                "**Esforço de Especificação/Documentação:**\n{}",
                canvas.text_or("specification_effort", NOT_ESTIMATED)
            ),
            format!(
                "**Esforço de Desenvolvimento:**\n{}",
                canvas.text_or("development_effort", NOT_ESTIMATED)
            ),
            format!(
                "**Esforço de Testes:**\n{}",
                canvas.text_or("testing_effort", NOT_ESTIMATED)
            ),
            "## Plano de Comunicação".to_string(),
            format!("**Materiais:**\n{}", format_list(&canvas.list("materials"))),
            format!("**Vídeos:**\n{}", format_list(&canvas.list("videos"))),
            format!("**Treinamento:**\n{}", format_list(&canvas.list("training"))),
            "## Custos".to_string(),
            format!(
                "**Fontes de Custo:**\n{}",
                format_list(&record_values(&state.costs, "item"))
            ),
            format!(
                "**Orçamento:**\n{}",
                canvas.text_or("budget", NOT_ESTIMATED)
            ),
            format!(
                "**Custo Total ao Longo do Tempo:**\n{}",
                canvas.text_or("total_cost_over_time", NOT_ESTIMATED)
            ),
            "## Métricas".to_string(),
            format!(
                "**Métricas de Sucesso:**\n{}",
                format_list(&record_values(&state.metrics, "metric"))
            ),
            format!(
                "**Métricas de Benefício:**\n{}",
                format_list(&canvas.list("benefit_metrics"))
            ),
            "---".to_string(),
            "## Informações Faltantes".to_string(),
            format_list(&state.information_gaps),
            "## Perguntas Sugeridas para Completar o Canvas".to_string(),
            suggested_questions(state),
        ];

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }
}

/// Read access to the free-form `canvas` object of the state.
struct CanvasFields<'a>(&'a serde_json::Map<String, Value>);

impl CanvasFields<'_> {
    fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(scalar_text)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            other => Some(scalar_text(other)),
        }
    }

    fn text_or(&self, key: &str, placeholder: &str) -> String {
        self.text(key).unwrap_or_else(|| placeholder.to_string())
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![scalar_text(other)],
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- None specified".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn record_values(records: &[Record], key: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(key))
        .filter(|v| !v.trim().is_empty())
        .map(String::from)
        .collect()
}

fn dependencies_of_type(dependencies: &[Record], kind: &str) -> Vec<String> {
    dependencies
        .iter()
        .filter(|d| d.get("type").is_some_and(|t| t.eq_ignore_ascii_case(kind)))
        .filter_map(|d| d.get("dependency"))
        .filter(|v| !v.trim().is_empty())
        .map(String::from)
        .collect()
}

fn format_risks(risks: &[Record]) -> String {
    if risks.is_empty() {
        return "- None identified".to_string();
    }
    risks
        .iter()
        .map(|risk| {
            format!(
                "**{}**\n  - Impact: {}\n  - Mitigation: {}\n",
                risk.get_or("risk", "Unknown"),
                risk.get_or("impact", "Not specified"),
                risk.get_or("mitigation", "Not specified"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn suggested_questions(state: &ActivityState) -> String {
    let mut questions = Vec::new();
    if state.functional_requirements.is_empty() {
        questions.push("- What are the key functional requirements?".to_string());
    }
    if state.identified_risks.len() < 2 {
        questions.push("- What are the main risks and how can they be mitigated?".to_string());
    }
    if state.metrics.is_empty() {
        questions.push("- How will we measure success?".to_string());
    }
    questions.extend(
        state
            .information_gaps
            .iter()
            .take(MAX_GAP_QUESTIONS)
            .map(|gap| format!("- {gap}?")),
    );

    if questions.is_empty() {
        "- Canvas appears complete!".to_string()
    } else {
        questions.join("\n")
    }
}
