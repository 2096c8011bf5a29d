//! Add command - Log information to an activity and update its state

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Select;

use super::input::read_text;
use crate::app::{App, StateUpdate};
use crate::types::{Entry, EntryType};

/// Where the entry text comes from
pub enum EntrySource<'a> {
    Text(&'a str),
    File(&'a Path),
    Prompt,
}

fn load_content(source: EntrySource<'_>) -> Result<Option<String>> {
    match source {
        EntrySource::Text(text) => Ok(Some(text.to_string())),
        EntrySource::File(path) => fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display())),
        EntrySource::Prompt => read_text("Enter the information to add:"),
    }
}

fn report(update: &StateUpdate, entry_type: EntryType, app: &App) {
    println!("{} Logged {} entry", "✓".green(), entry_type.to_string().cyan());
    match update {
        StateUpdate::Updated(state) => println!(
            "{} State updated: {} requirement(s), {} question(s), {} risk(s)",
            "✓".green(),
            state.requirement_count(),
            state.question_count(),
            state.identified_risks.len()
        ),
        StateUpdate::Unchanged if app.processor.is_available() => println!(
            "{} State extraction failed; the entry is in the log but state.json was not changed",
            "!".yellow()
        ),
        StateUpdate::Unchanged => println!(
            "{}",
            "  LLM not configured, state.json was not changed".dimmed()
        ),
    }
}

pub fn add(
    app: &App,
    slug: &str,
    entry_type: Option<EntryType>,
    source: EntrySource<'_>,
) -> Result<()> {
    if app.storage.is_finalized(slug) {
        bail!("Activity '{slug}' is finalized; no more entries can be added");
    }
    app.storage.require_activity(slug)?;

    let origin = match &source {
        EntrySource::File(path) => Some(path.display().to_string()),
        _ => None,
    };
    let Some(content) = load_content(source)?.filter(|c| !c.trim().is_empty()) else {
        println!("{}", "Nothing to add.".dimmed());
        return Ok(());
    };

    let entry_type = entry_type.unwrap_or_else(|| app.classify(&content));
    let mut entry = Entry::new(entry_type, content.trim());
    if let Some(origin) = origin {
        entry = entry.with_metadata("source", origin);
    }
    let update = app.add_entry(slug, &entry)?;
    report(&update, entry_type, app);
    Ok(())
}

/// Interactive variant: pick the kind (or let it be classified), then type.
pub fn interactive(app: &App, slug: &str) -> Result<()> {
    let mut items = vec!["auto (classify)".to_string()];
    items.extend(EntryType::ALL.iter().map(|t| t.heading()));

    let choice = Select::new()
        .with_prompt("Entry type")
        .items(&items)
        .default(0)
        .interact()?;
    let entry_type = choice.checked_sub(1).map(|i| EntryType::ALL[i]);

    add(app, slug, entry_type, EntrySource::Prompt)
}

pub fn run(
    app: &App,
    slug: &str,
    entry_type: Option<EntryType>,
    text: Option<&str>,
    file: Option<&Path>,
) -> Result<()> {
    let source = match (text, file) {
        (Some(text), _) => EntrySource::Text(text),
        (None, Some(path)) => EntrySource::File(path),
        (None, None) => EntrySource::Prompt,
    };
    add(app, slug, entry_type, source)
}
