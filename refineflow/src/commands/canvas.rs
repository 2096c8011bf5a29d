//! Canvas command - Generate the Business Case Canvas

use anyhow::Result;
use colored::Colorize;

use crate::app::App;
use crate::export::CanvasExporter;

/// Print the stored `canvas.md` without regenerating it.
pub fn show(app: &App, slug: &str) -> Result<()> {
    app.storage.require_activity(slug)?;
    let canvas = app.storage.read_canvas(slug);
    if canvas.trim().is_empty() {
        println!("{}", "No canvas yet. Run `refineflow canvas <slug>`.".yellow());
    } else {
        println!("\n{}", canvas);
    }
    Ok(())
}

pub fn run(app: &App, slug: &str) -> Result<()> {
    let activity = app.storage.require_activity(slug)?;
    let state = app.state_for(slug)?;

    if !app.processor.is_available() {
        println!(
            "{}",
            "LLM not configured, filling the canvas from the current state".dimmed()
        );
    }
    let canvas = app.block_on_with_spinner(
        "Generating canvas...",
        CanvasExporter::render(&activity, &state, &app.processor),
    );
    let path = app.storage.write_canvas(slug, &canvas)?;

    println!("\n{}\n", canvas);
    println!("{} Canvas written to {}", "✓".green(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProcessor;
    use crate::types::{AppConfig, NewActivity};

    fn app(tmp: &tempfile::TempDir) -> App {
        let mut config = AppConfig::default();
        config.storage.data_dir = tmp.path().to_string_lossy().to_string();
        App::with_processor(config, LlmProcessor::unavailable())
            .unwrap()
            .without_spinner()
    }

    #[test]
    fn test_run_writes_fallback_canvas() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(&tmp);
        let activity = app
            .storage
            .create_activity(&NewActivity::new("Login", "Autenticação"))
            .unwrap();

        run(&app, &activity.slug).unwrap();
        let canvas = app.storage.read_canvas(&activity.slug);
        assert!(canvas.contains("Login"));
        assert!(show(&app, &activity.slug).is_ok());
    }

    #[test]
    fn test_show_unknown_activity_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(&tmp);
        assert!(show(&app, "nope").is_err());
    }
}
