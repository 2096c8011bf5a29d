//! Activity menu - Everything that can be done with one activity

use anyhow::Result;
use colored::Colorize;
use dialoguer::Select;

use super::{add, canvas, chat, export, finalize, questions};
use crate::app::App;
use crate::timestamp;
use crate::types::{ActivityStatus, ExportFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddInfo,
    Chat,
    Questions,
    Canvas,
    Export,
    Finalize,
    Back,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::AddInfo => "Add information",
            Action::Chat => "Chat about the activity",
            Action::Questions => "View open questions",
            Action::Canvas => "Generate Business Case Canvas",
            Action::Export => "Export to Jira",
            Action::Finalize => "Finalize activity",
            Action::Back => "Back",
        }
    }
}

fn actions_for(status: ActivityStatus) -> Vec<Action> {
    let mut actions = Vec::new();
    if status == ActivityStatus::InProgress {
        actions.push(Action::AddInfo);
    }
    actions.extend([
        Action::Chat,
        Action::Questions,
        Action::Canvas,
        Action::Export,
    ]);
    if status == ActivityStatus::InProgress {
        actions.push(Action::Finalize);
    }
    actions.push(Action::Back);
    actions
}

fn print_header(app: &App, slug: &str) -> Result<ActivityStatus> {
    let activity = app.storage.require_activity(slug)?;
    let state = app.state_for(slug)?;
    println!("\n{} {}", "●".cyan(), activity.title.bold());
    println!(
        "  {}",
        format!(
            "{} | updated {} | {} requirement(s), {} question(s), {} risk(s)",
            activity.status,
            timestamp::format(&activity.updated_at),
            state.requirement_count(),
            state.question_count(),
            state.identified_risks.len()
        )
        .dimmed()
    );
    Ok(activity.status)
}

fn pick_format() -> Result<ExportFormat> {
    let formats = [ExportFormat::Markdown, ExportFormat::Json, ExportFormat::Csv];
    let labels: Vec<String> = formats.iter().map(|f| f.to_string()).collect();
    let choice = Select::new()
        .with_prompt("Format")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(formats[choice])
}

fn perform(app: &App, slug: &str, action: Action) -> Result<()> {
    match action {
        Action::AddInfo => add::interactive(app, slug),
        Action::Chat => chat::run(app, slug),
        Action::Questions => questions::run(app, slug),
        Action::Canvas => canvas::run(app, slug),
        Action::Export => export::run(app, slug, pick_format()?).map(|_| ()),
        Action::Finalize => finalize::run(app, slug, false),
        Action::Back => Ok(()),
    }
}

pub fn run(app: &App, slug: &str) -> Result<()> {
    loop {
        let status = print_header(app, slug)?;
        let actions = actions_for(status);
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();

        let choice = Select::new()
            .with_prompt("What do you want to do?")
            .items(&labels)
            .default(0)
            .interact()?;
        let action = actions[choice];
        if action == Action::Back {
            return Ok(());
        }
        // A failed action is reported and the menu stays open
        if let Err(e) = perform(app, slug, action) {
            eprintln!("{} {:#}", "✗".red(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalized_activity_hides_write_actions() {
        let actions = actions_for(ActivityStatus::Finalized);
        assert!(!actions.contains(&Action::AddInfo));
        assert!(!actions.contains(&Action::Finalize));
        assert_eq!(actions.last(), Some(&Action::Back));
    }

    #[test]
    fn test_in_progress_activity_offers_everything() {
        let actions = actions_for(ActivityStatus::InProgress);
        assert_eq!(actions.len(), 7);
        assert_eq!(actions[0], Action::AddInfo);
    }
}
