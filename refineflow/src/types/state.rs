//! Structured state document kept per activity in `state.json`.
//!
//! The document is rebuilt wholesale every time an entry is processed:
//! the extractor produces a candidate `ActivityState` and
//! [`crate::state::merge`] folds it into the persisted one.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Category that flat, uncategorized question lists are filed under.
pub const DEFAULT_QUESTION_CATEGORY: &str = "Geral";

/// Category label -> ordered question list.
pub type CategorizedQuestions = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("open_questions must be a list of strings or a mapping of category to list of strings, got {0}")]
    MalformedQuestions(String),
}

/// Small structured sub-entity (action item, decision, risk, ...).
///
/// Keys are open-ended: an action item usually carries `action`, `owner`
/// and `status`, but nothing guarantees which keys are present. Keys are kept
/// sorted, so equality and hashing compare the sorted key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key`, or `fallback` when missing or blank.
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        match self.get(key) {
            Some(v) if !v.trim().is_empty() => v,
            _ => fallback,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Record(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        // A null value keeps its key as an empty string, so the key set
        // still takes part in record equality.
        let fields = raw
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    nested => nested.to_string(),
                };
                (key, text)
            })
            .collect();
        Ok(Record(fields))
    }
}

/// The mutable structured document associated with an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityState {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<Record>,
    #[serde(default, deserialize_with = "deserialize_open_questions")]
    pub open_questions: CategorizedQuestions,
    #[serde(default)]
    pub decisions: Vec<Record>,
    #[serde(default)]
    pub functional_requirements: Vec<String>,
    #[serde(default)]
    pub non_functional_requirements: Vec<String>,
    #[serde(default)]
    pub identified_risks: Vec<Record>,
    #[serde(default)]
    pub dependencies: Vec<Record>,
    #[serde(default)]
    pub metrics: Vec<Record>,
    #[serde(default)]
    pub costs: Vec<Record>,
    #[serde(default)]
    pub information_gaps: Vec<String>,
    #[serde(default)]
    pub canvas: Map<String, Value>,
    #[serde(default)]
    pub last_updated: String,
}

impl ActivityState {
    /// Initial state of a freshly created activity.
    pub fn empty(summary: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            last_updated: timestamp.into(),
            ..Self::default()
        }
    }

    pub fn merge_with(&self, incoming: &ActivityState) -> ActivityState {
        crate::state::merge(self, incoming)
    }

    pub fn question_count(&self) -> usize {
        self.open_questions.values().map(Vec::len).sum()
    }

    pub fn requirement_count(&self) -> usize {
        self.functional_requirements.len() + self.non_functional_requirements.len()
    }
}

/// Bring either historical shape of `open_questions` into the mapping shape.
///
/// A flat list is filed under [`DEFAULT_QUESTION_CATEGORY`]; a mapping passes
/// through untouched, empty categories included. `null` counts as absent.
pub fn normalize_open_questions(raw: Value) -> Result<CategorizedQuestions, StateError> {
    match raw {
        Value::Null => Ok(CategorizedQuestions::new()),
        Value::Array(items) => {
            let questions = string_list(items, "list")?;
            let mut map = CategorizedQuestions::new();
            map.insert(DEFAULT_QUESTION_CATEGORY.to_string(), questions);
            Ok(map)
        }
        Value::Object(categories) => categories
            .into_iter()
            .map(|(category, value)| match value {
                Value::Array(items) => {
                    let context = format!("category '{category}'");
                    Ok((category, string_list(items, &context)?))
                }
                other => Err(StateError::MalformedQuestions(format!(
                    "{} for category '{category}'",
                    json_kind(&other)
                ))),
            })
            .collect(),
        other => Err(StateError::MalformedQuestions(json_kind(&other).to_string())),
    }
}

fn string_list(items: Vec<Value>, context: &str) -> Result<Vec<String>, StateError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(StateError::MalformedQuestions(format!(
                "{} inside {context}",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn deserialize_open_questions<'de, D>(deserializer: D) -> Result<CategorizedQuestions, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    normalize_open_questions(raw).map_err(serde::de::Error::custom)
}
