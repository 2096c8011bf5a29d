//! New command - Create an activity interactively

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;

use crate::app::App;
use crate::types::activity::parse_stakeholders;
use crate::types::{Activity, NewActivity};

fn optional(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

pub fn prompt_new_activity() -> Result<NewActivity> {
    let title: String = Input::new()
        .with_prompt("Title")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.chars().any(|c| c.is_alphanumeric()) {
                Ok(())
            } else {
                Err("Title needs at least one letter or digit")
            }
        })
        .interact_text()?;
    let description: String = Input::new().with_prompt("Description").interact_text()?;

    Ok(NewActivity {
        title,
        description,
        problem: optional("Problem (optional)")?,
        stakeholders: parse_stakeholders(&optional("Stakeholders, comma separated (optional)")?),
        constraints: optional("Constraints / deadline (optional)")?,
        affected_system: optional("Affected system (optional)")?,
    })
}

pub fn create(app: &App) -> Result<Activity> {
    println!("{}", "\nNew activity\n".bold());
    let new = prompt_new_activity()?;
    let activity = app.storage.create_activity(&new)?;

    println!(
        "\n{} Created {} ({})",
        "✓".green(),
        activity.title.bold(),
        activity.slug.cyan()
    );
    println!(
        "  {}",
        app.storage.activity_dir(&activity.slug).display().to_string().dimmed()
    );
    Ok(activity)
}

pub fn run(app: &App) -> Result<()> {
    create(app).map(|_| ())
}
