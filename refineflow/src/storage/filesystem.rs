//! Filesystem store for activities under `<data_dir>/activities/<slug>/`.
//!
//! Each activity directory holds:
//! - `activity.json` / `activity.md` with the activity metadata
//! - `state.json` with the structured [`ActivityState`]
//! - `log.md`, the append-only entry log
//! - `chat.md`, `canvas.md` and `jira_export.*` generated artifacts
//!
//! JSON documents are written atomically (temp file + rename). Every
//! metadata write is mirrored into the SQLite [`ActivityIndex`].

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::index::{ActivityIndex, IndexedActivity};
use super::templates;
use crate::timestamp;
use crate::types::{Activity, ActivityState, ActivityStatus, Entry, ExportFormat, NewActivity};

const MAX_SLUG_LEN: usize = 50;

const ACTIVITY_JSON: &str = "activity.json";
const ACTIVITY_MD: &str = "activity.md";
const STATE_JSON: &str = "state.json";
const LOG_MD: &str = "log.md";
const CHAT_MD: &str = "chat.md";
const CANVAS_MD: &str = "canvas.md";

/// Turn a title into a directory-safe slug.
///
/// Lowercases, drops punctuation, joins words with `-` and caps the length.
/// Returns `None` when nothing usable is left.
pub fn slugify(text: &str) -> Option<String> {
    let strip = Regex::new(r"[^\w\s-]").ok()?;
    let collapse = Regex::new(r"[-\s]+").ok()?;

    let lowered = text.trim().to_lowercase();
    let stripped = strip.replace_all(&lowered, "");
    let joined = collapse.replace_all(&stripped, "-");
    let slug: String = joined.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Write data to a file atomically using temp file + rename pattern.
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    atomic_write(path, &json)
}

fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("")
    ));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to rename {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

fn append_text(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to append to {}", path.display()))
}

/// Markdown block appended to `log.md` for one entry.
pub fn format_log_entry(entry: &Entry) -> String {
    let mut text = format!(
        "\n## {} - {}\n\n{}\n\n",
        entry.entry_type.heading(),
        timestamp::format(&entry.timestamp),
        entry.content
    );
    if !entry.metadata.is_empty() {
        text.push_str("**Metadata:**\n");
        for (key, value) in &entry.metadata {
            text.push_str(&format!("- {key}: {value}\n"));
        }
        text.push('\n');
    }
    text.push_str("---\n");
    text
}

pub struct ActivityStorage {
    activities_dir: PathBuf,
    index: ActivityIndex,
}

impl ActivityStorage {
    /// Open (and create if needed) the store rooted at `data_dir`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let activities_dir = data_dir.join("activities");
        fs::create_dir_all(&activities_dir)
            .with_context(|| format!("Failed to create {}", activities_dir.display()))?;
        let index = ActivityIndex::open(&data_dir.join("refineflow.db"))?;
        Ok(Self {
            activities_dir,
            index,
        })
    }

    pub fn activities_dir(&self) -> &Path {
        &self.activities_dir
    }

    pub fn activity_dir(&self, slug: &str) -> PathBuf {
        self.activities_dir.join(slug)
    }

    fn file(&self, slug: &str, name: &str) -> PathBuf {
        self.activity_dir(slug).join(name)
    }

    pub fn exists(&self, slug: &str) -> bool {
        is_valid_slug(slug) && self.file(slug, ACTIVITY_JSON).exists()
    }

    fn unique_slug(&self, base: &str) -> String {
        if !self.activity_dir(base).exists() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.activity_dir(candidate).exists())
            .unwrap_or_else(|| base.to_string())
    }

    /// Create the directory, seed every file and register the activity.
    pub fn create_activity(&self, new: &NewActivity) -> Result<Activity> {
        let Some(base_slug) = slugify(&new.title) else {
            bail!("Activity title '{}' has no usable characters", new.title);
        };
        let slug = self.unique_slug(&base_slug);
        let now = timestamp::now();

        let activity = Activity {
            slug: slug.clone(),
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            status: ActivityStatus::InProgress,
            created_at: now.clone(),
            updated_at: now.clone(),
            metadata: Default::default(),
            problem: new.problem.trim().to_string(),
            stakeholders: new.stakeholders.clone(),
            constraints: new.constraints.trim().to_string(),
            affected_system: new.affected_system.trim().to_string(),
        };

        let dir = self.activity_dir(&slug);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        fs::write(
            self.file(&slug, LOG_MD),
            templates::render_log_header(&activity.title),
        )?;
        fs::write(
            self.file(&slug, CANVAS_MD),
            templates::render_canvas_placeholder(&activity.title),
        )?;
        fs::write(
            self.file(&slug, ExportFormat::Markdown.file_name()),
            templates::render_jira_header(&activity.title, &timestamp::format(&now)),
        )?;
        fs::write(
            self.file(&slug, CHAT_MD),
            templates::render_chat_header(&activity.title),
        )?;

        let initial_state = ActivityState::empty(activity.description.clone(), now);
        self.save_state(&slug, &initial_state)?;
        self.save_activity(&activity)?;

        info!(slug = %slug, path = %dir.display(), "Created activity");
        Ok(activity)
    }

    pub fn load_activity(&self, slug: &str) -> Option<Activity> {
        if !is_valid_slug(slug) {
            return None;
        }
        let content = fs::read_to_string(self.file(slug, ACTIVITY_JSON)).ok()?;
        match serde_json::from_str(&content) {
            Ok(activity) => Some(activity),
            Err(e) => {
                warn!(slug, error = %e, "Ignoring unreadable activity.json");
                None
            }
        }
    }

    pub fn require_activity(&self, slug: &str) -> Result<Activity> {
        self.load_activity(slug)
            .with_context(|| format!("Activity not found: {slug}"))
    }

    /// Persist metadata, re-render `activity.md` and refresh the index.
    pub fn save_activity(&self, activity: &Activity) -> Result<()> {
        if !is_valid_slug(&activity.slug) {
            bail!("Invalid activity slug: '{}'", activity.slug);
        }
        atomic_write_json(&self.file(&activity.slug, ACTIVITY_JSON), activity)?;
        atomic_write(
            &self.file(&activity.slug, ACTIVITY_MD),
            &templates::render_activity(activity),
        )?;
        self.index.upsert(activity)?;
        debug!(slug = %activity.slug, "Saved activity");
        Ok(())
    }

    /// Load the state document. A missing file yields `None`; a malformed one
    /// is an error and stays on disk untouched.
    pub fn load_state(&self, slug: &str) -> Result<Option<ActivityState>> {
        if !is_valid_slug(slug) {
            return Ok(None);
        }
        let path = self.file(slug, STATE_JSON);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let state = serde_json::from_str(&content).with_context(|| {
            format!(
                "{} is malformed; fix or remove it before continuing",
                path.display()
            )
        })?;
        Ok(Some(state))
    }

    pub fn save_state(&self, slug: &str, state: &ActivityState) -> Result<()> {
        atomic_write_json(&self.file(slug, STATE_JSON), state)?;
        debug!(slug, "Saved state");
        Ok(())
    }

    /// Append an entry to `log.md` and bump the activity's `updated_at`.
    pub fn append_entry(&self, slug: &str, entry: &Entry) -> Result<()> {
        let mut activity = self.require_activity(slug)?;
        append_text(&self.file(slug, LOG_MD), &format_log_entry(entry))?;

        activity.updated_at = timestamp::now();
        self.save_activity(&activity)?;
        info!(slug, entry_type = %entry.entry_type, "Appended entry to log");
        Ok(())
    }

    pub fn append_chat(&self, slug: &str, question: &str, answer: &str) -> Result<()> {
        let text = format!(
            "\n## {}\n\n**Pergunta:** {question}\n\n**Resposta:**\n\n{answer}\n\n---\n",
            timestamp::format(&timestamp::now())
        );
        append_text(&self.file(slug, CHAT_MD), &text)
    }

    pub fn read_log(&self, slug: &str) -> String {
        fs::read_to_string(self.file(slug, LOG_MD)).unwrap_or_default()
    }

    pub fn read_canvas(&self, slug: &str) -> String {
        fs::read_to_string(self.file(slug, CANVAS_MD)).unwrap_or_default()
    }

    pub fn write_canvas(&self, slug: &str, content: &str) -> Result<PathBuf> {
        let path = self.file(slug, CANVAS_MD);
        atomic_write(&path, content)?;
        info!(slug, "Wrote canvas");
        Ok(path)
    }

    pub fn write_jira_export(
        &self,
        slug: &str,
        format: ExportFormat,
        content: &str,
    ) -> Result<PathBuf> {
        let path = self.file(slug, format.file_name());
        atomic_write(&path, content)?;
        info!(slug, format = %format, "Wrote Jira export");
        Ok(path)
    }

    /// Every readable activity, newest `updated_at` first.
    pub fn list_activities(&self, status: Option<ActivityStatus>) -> Result<Vec<Activity>> {
        let entries = fs::read_dir(&self.activities_dir)
            .with_context(|| format!("Failed to read {}", self.activities_dir.display()))?;

        let mut activities: Vec<Activity> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| self.load_activity(&entry.file_name().to_string_lossy()))
            .filter(|activity| status.map_or(true, |s| activity.status == s))
            .collect();

        activities.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(activities)
    }

    pub fn search(
        &self,
        query: &str,
        status: Option<ActivityStatus>,
    ) -> Result<Vec<IndexedActivity>> {
        self.index.search(query, status)
    }

    /// Rebuild the index from the activity directories, dropping rows whose
    /// directory is gone.
    pub fn reindex(&self) -> Result<usize> {
        let activities = self.list_activities(None)?;
        for activity in &activities {
            self.index.upsert(activity)?;
        }
        for row in self.index.search("", None)? {
            if !self.exists(&row.slug) && self.index.delete(&row.slug)? {
                info!(slug = %row.slug, "Dropped stale index entry");
            }
        }
        Ok(activities.len())
    }

    pub fn finalize_activity(&self, slug: &str) -> Result<Activity> {
        let mut activity = self.require_activity(slug)?;
        activity.status = ActivityStatus::Finalized;
        activity.updated_at = timestamp::now();
        self.save_activity(&activity)?;
        info!(slug, "Finalized activity");
        Ok(activity)
    }

    pub fn is_finalized(&self, slug: &str) -> bool {
        self.load_activity(slug)
            .is_some_and(|activity| activity.is_finalized())
    }
}
