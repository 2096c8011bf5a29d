//! List command - Show activities, optionally filtered

use anyhow::Result;
use colored::Colorize;

use crate::app::App;
use crate::timestamp;
use crate::types::ActivityStatus;

pub struct ListRow {
    pub slug: String,
    pub title: String,
    pub status: ActivityStatus,
    pub updated_at: String,
}

fn status_label(status: ActivityStatus) -> String {
    match status {
        ActivityStatus::InProgress => status.to_string().cyan().to_string(),
        ActivityStatus::Finalized => status.to_string().green().to_string(),
    }
}

/// Filesystem listing, or an index search when `search` is given.
pub fn collect(
    app: &App,
    status: Option<ActivityStatus>,
    search: Option<&str>,
) -> Result<Vec<ListRow>> {
    let rows = match search {
        Some(query) => app
            .storage
            .search(query, status)?
            .into_iter()
            .map(|a| ListRow {
                slug: a.slug,
                title: a.title,
                status: a.status,
                updated_at: a.updated_at,
            })
            .collect(),
        None => app
            .storage
            .list_activities(status)?
            .into_iter()
            .map(|a| ListRow {
                slug: a.slug,
                title: a.title,
                status: a.status,
                updated_at: a.updated_at,
            })
            .collect(),
    };
    Ok(rows)
}

pub fn format_row(row: &ListRow) -> String {
    format!(
        "{}  {}  [{}]  {}",
        row.slug.bold(),
        row.title,
        status_label(row.status),
        timestamp::format(&row.updated_at).dimmed()
    )
}

pub fn run(
    app: &App,
    status: Option<ActivityStatus>,
    search: Option<&str>,
    reindex: bool,
) -> Result<()> {
    if reindex {
        let count = app.storage.reindex()?;
        println!("{} Reindexed {count} activities", "✓".green());
    }

    let rows = collect(app, status, search)?;

    if rows.is_empty() {
        eprintln!("{}", "No activities found.".yellow());
        if search.is_none() && status.is_none() {
            eprintln!("{}", "Run `refineflow new` to create one.".dimmed());
        }
        return Ok(());
    }

    for row in &rows {
        println!("{}", format_row(row));
    }
    let noun = if rows.len() == 1 { "activity" } else { "activities" };
    println!("\n{}", format!("{} {noun}", rows.len()).dimmed());
    Ok(())
}
