//! Export command - Write the Jira export for an activity

use anyhow::Result;
use colored::Colorize;

use crate::app::App;
use crate::export::{JiraExporter, StructureCheck};
use crate::types::ExportFormat;

fn report_structure(check: &StructureCheck) {
    if check.valid {
        println!("{} Structure looks complete", "✓".green());
    } else {
        println!("{}", "Structure warnings:".yellow());
    }
    for warning in &check.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
}

pub fn run(app: &App, slug: &str, format: ExportFormat) -> Result<Option<StructureCheck>> {
    let activity = app.storage.require_activity(slug)?;
    let state = app.state_for(slug)?;

    let export = app.block_on_with_spinner(
        "Generating Jira export...",
        JiraExporter::render(format, &activity, &state, &app.processor),
    )?;
    let path = app.storage.write_jira_export(slug, format, &export.content)?;

    println!("{} Jira export ({}) written to {}", "✓".green(), format, path.display());
    if let Some(check) = &export.structure {
        report_structure(check);
    }
    Ok(export.structure)
}
