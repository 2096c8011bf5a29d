//! Chat - Ask questions about an activity

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;

use crate::app::App;

/// One question and answer, recorded in `chat.md`.
pub fn ask(app: &App, slug: &str, question: &str) -> Result<String> {
    let activity = app.storage.require_activity(slug)?;
    let state = app.state_for(slug)?;
    let log = app.storage.read_log(slug);

    let answer = app.block_on_with_spinner(
        "Thinking...",
        app.processor
            .answer_question(&activity, &state, &log, question),
    );
    app.storage.append_chat(slug, question, &answer)?;
    Ok(answer)
}

/// Ask questions until an empty line.
pub fn run(app: &App, slug: &str) -> Result<()> {
    let activity = app.storage.require_activity(slug)?;
    println!("{}", format!("\nChat: {}", activity.title).bold());
    println!("{}", "Empty question to go back.\n".dimmed());

    loop {
        let question: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()?;
        if question.trim().is_empty() {
            return Ok(());
        }
        let answer = ask(app, slug, question.trim())?;
        println!("\n{}\n", answer);
    }
}
