use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of an activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    InProgress,
    Finalized,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::InProgress => write!(f, "in_progress"),
            ActivityStatus::Finalized => write!(f, "finalized"),
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "in_progress" => Ok(ActivityStatus::InProgress),
            "finalized" => Ok(ActivityStatus::Finalized),
            _ => Err(format!(
                "Unknown status: '{s}'. Expected: in_progress, finalized"
            )),
        }
    }
}

/// Kind of information captured in a log entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    Note,
    Question,
    Answer,
    Transcript,
    JiraDescription,
    Decision,
    Requirement,
    Risk,
    Metric,
    Cost,
    Dependency,
}

impl EntryType {
    pub const ALL: [EntryType; 11] = [
        EntryType::Note,
        EntryType::Question,
        EntryType::Answer,
        EntryType::Transcript,
        EntryType::JiraDescription,
        EntryType::Decision,
        EntryType::Requirement,
        EntryType::Risk,
        EntryType::Metric,
        EntryType::Cost,
        EntryType::Dependency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Note => "note",
            EntryType::Question => "question",
            EntryType::Answer => "answer",
            EntryType::Transcript => "transcript",
            EntryType::JiraDescription => "jira_description",
            EntryType::Decision => "decision",
            EntryType::Requirement => "requirement",
            EntryType::Risk => "risk",
            EntryType::Metric => "metric",
            EntryType::Cost => "cost",
            EntryType::Dependency => "dependency",
        }
    }

    /// Heading used for the entry inside `log.md`, e.g. `Jira Description`.
    pub fn heading(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        EntryType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                let expected: Vec<&str> = EntryType::ALL.iter().map(|t| t.as_str()).collect();
                format!(
                    "Unknown entry type: '{s}'. Expected: {}",
                    expected.join(", ")
                )
            })
    }
}

/// Output encoding of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: '{s}'. Expected: compact, json")),
        }
    }
}

/// Jira export encodings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "jira_export.md",
            ExportFormat::Json => "jira_export.json",
            ExportFormat::Csv => "jira_export.csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}
