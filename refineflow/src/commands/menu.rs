//! Interactive main menu, shown when no subcommand is given

use anyhow::Result;
use colored::Colorize;
use dialoguer::Select;

use super::{list, new, open};
use crate::app::App;

const MAIN_MENU: [&str; 3] = ["Create new activity", "Open existing activity", "Exit"];

fn pick_activity(app: &App) -> Result<Option<String>> {
    let rows = list::collect(app, None, None)?;
    if rows.is_empty() {
        println!("{}", "No activities yet. Create one first.".yellow());
        return Ok(None);
    }

    let mut labels: Vec<String> = rows.iter().map(list::format_row).collect();
    labels.push("Back".to_string());

    let choice = Select::new()
        .with_prompt("Select an activity")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(rows.get(choice).map(|row| row.slug.clone()))
}

pub fn run(app: &App) -> Result<()> {
    println!("{}", "\nRefineFlow\n".bold());
    if !app.processor.is_available() {
        println!(
            "{}",
            "OPENAI_API_KEY not set: entries are logged but not analyzed\n".yellow()
        );
    }

    loop {
        let choice = Select::new()
            .with_prompt("Main menu")
            .items(&MAIN_MENU)
            .default(0)
            .interact()?;

        let opened = match choice {
            0 => new::create(app).map(|activity| Some(activity.slug)),
            1 => pick_activity(app),
            _ => return Ok(()),
        };
        match opened {
            Ok(Some(slug)) => open::run(app, &slug)?,
            Ok(None) => {}
            Err(e) => eprintln!("{} {:#}", "✗".red(), e),
        }
    }
}
