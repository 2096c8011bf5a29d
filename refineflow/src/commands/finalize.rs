//! Finalize command - Close an activity for new entries

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use crate::app::App;

pub fn run(app: &App, slug: &str, yes: bool) -> Result<()> {
    let activity = app.storage.require_activity(slug)?;
    if activity.is_finalized() {
        println!("{}", format!("{} is already finalized.", activity.title).dimmed());
        return Ok(());
    }

    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!(
                "Finalize '{}'? No more entries can be added afterwards",
                activity.title
            ))
            .default(false)
            .interact()?;
    if !confirmed {
        println!("{}", "Aborted.".dimmed());
        return Ok(());
    }

    app.storage.finalize_activity(slug)?;
    println!("{} Finalized {}", "✓".green(), activity.title.bold());
    Ok(())
}
