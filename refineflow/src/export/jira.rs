use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};

use super::validator::validate_structure;
use crate::llm::LlmProcessor;
use crate::timestamp;
use crate::types::{Activity, ActivityState, ExportFormat};

const CSV_REQUIREMENTS: usize = 3;
const HEADER_PREFIX: &str = "# Jira Export: ";
const HEADER_END: &str = "\n---\n\n";

/// Validator verdict on a generated breakdown body
#[derive(Debug, Clone, PartialEq)]
pub struct StructureCheck {
    pub valid: bool,
    pub warnings: Vec<String>,
}

/// A rendered export. Only markdown carries a structure verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct JiraExport {
    pub content: String,
    pub structure: Option<StructureCheck>,
}

pub struct JiraExporter;

impl JiraExporter {
    pub async fn render(
        format: ExportFormat,
        activity: &Activity,
        state: &ActivityState,
        processor: &LlmProcessor,
    ) -> Result<JiraExport> {
        let content = match format {
            ExportFormat::Markdown => return Ok(Self::markdown(activity, state, processor).await),
            ExportFormat::Json => Self::json(activity, state)?,
            ExportFormat::Csv => Self::csv(activity, state),
        };
        Ok(JiraExport {
            content,
            structure: None,
        })
    }

    /// Generated task breakdown under an export header.
    pub async fn markdown(
        activity: &Activity,
        state: &ActivityState,
        processor: &LlmProcessor,
    ) -> JiraExport {
        let body = processor.generate_jira(activity, state).await;
        Self::with_header(activity, &body)
    }

    /// Validate `body` on its own, then put the export header on top.
    /// Structure problems are logged, never fatal.
    pub fn with_header(activity: &Activity, body: &str) -> JiraExport {
        let (valid, warnings) = validate_structure(Some(body));
        if valid {
            info!(slug = %activity.slug, "Jira export passed structure validation");
        } else {
            for warning in &warnings {
                warn!(slug = %activity.slug, "Jira export: {}", warning);
            }
        }

        JiraExport {
            content: format!(
                "{HEADER_PREFIX}{}\n\n**Generated**: {}\n**Status**: {}{HEADER_END}{}",
                activity.title,
                timestamp::now(),
                activity.status,
                body
            ),
            structure: Some(StructureCheck { valid, warnings }),
        }
    }

    /// The breakdown without the export header, or the whole text when it
    /// has none.
    pub fn strip_header(content: &str) -> &str {
        if !content.starts_with(HEADER_PREFIX) {
            return content;
        }
        content
            .find(HEADER_END)
            .map_or(content, |at| &content[at + HEADER_END.len()..])
    }

    pub fn json(activity: &Activity, state: &ActivityState) -> Result<String> {
        let requirements: Vec<&String> = state
            .functional_requirements
            .iter()
            .chain(&state.non_functional_requirements)
            .collect();

        let document = json!({
            "parent": {
                "title": activity.title,
                "description": activity.description,
                "summary": state.summary,
                "requirements": requirements,
                "risks": state.identified_risks,
            },
            "subtasks": [
                {
                    "title": format!("[BE] {}", activity.title),
                    "description": "Backend implementation",
                    "type": "backend",
                },
                {
                    "title": format!("[FE] {}", activity.title),
                    "description": "Frontend implementation",
                    "type": "frontend",
                },
            ],
        });

        serde_json::to_string_pretty(&document).context("Failed to serialize Jira JSON export")
    }

    pub fn csv(activity: &Activity, state: &ActivityState) -> String {
        let parent_requirements = state
            .functional_requirements
            .iter()
            .take(CSV_REQUIREMENTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        let backend_title = format!("[BE] {}", activity.title);
        let frontend_title = format!("[FE] {}", activity.title);

        let rows: [[&str; 4]; 4] = [
            ["Type", "Title", "Description", "Requirements"],
            [
                "Parent",
                &activity.title,
                &activity.description,
                &parent_requirements,
            ],
            ["Backend Subtask", &backend_title, "Backend implementation", ""],
            [
                "Frontend Subtask",
                &frontend_title,
                "Frontend implementation",
                "",
            ],
        ];

        rows.iter()
            .map(|row| {
                let mut line = row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
                line.push_str("\r\n");
                line
            })
            .collect()
    }
}

/// RFC 4180 quoting: quote when the field holds a separator, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
