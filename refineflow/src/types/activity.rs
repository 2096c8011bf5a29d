use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{ActivityStatus, EntryType};

/// A work item being refined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ActivityStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub affected_system: String,
}

impl Activity {
    pub fn is_finalized(&self) -> bool {
        self.status == ActivityStatus::Finalized
    }
}

/// Everything the user supplies when creating an activity
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub problem: String,
    pub stakeholders: Vec<String>,
    pub constraints: String,
    pub affected_system: String,
}

impl NewActivity {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_type: EntryType,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(entry_type: EntryType, content: impl Into<String>) -> Self {
        Self {
            entry_type,
            content: content.into(),
            timestamp: crate::timestamp::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Split a comma separated stakeholder answer into trimmed names.
pub fn parse_stakeholders(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
