//! Doctor command - Check configuration and environment

use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::config::loader::{read_config, validate_config};
use crate::config::ConfigError;
use crate::storage::ActivityIndex;
use crate::types::AppConfig;

struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    required: bool,
    details: Option<String>,
}

enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

impl CheckResult {
    fn pass(name: &str, required: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            message: message.into(),
            required,
            details: None,
        }
    }

    fn problem(
        name: &str,
        required: bool,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: if required {
                CheckStatus::Fail
            } else {
                CheckStatus::Warn
            },
            message: message.into(),
            required,
            details: Some(details.into()),
        }
    }
}

fn format_result(result: &CheckResult) -> String {
    let icon = match result.status {
        CheckStatus::Pass => "✓".green().to_string(),
        CheckStatus::Fail => "✗".red().to_string(),
        CheckStatus::Warn => "!".yellow().to_string(),
    };

    let optional = if result.required { "" } else { " (optional)" };
    let message = match result.status {
        CheckStatus::Fail => result.message.red().to_string(),
        _ => result.message.clone(),
    };

    let mut line = format!("  {} {}: {}{}", icon, result.name, message, optional.dimmed());
    if let Some(ref details) = result.details {
        if !matches!(result.status, CheckStatus::Pass) {
            line += &format!("\n      {}", details.dimmed());
        }
    }
    line
}

fn check_config(config_path: &str) -> CheckResult {
    if !Path::new(config_path).exists() {
        return CheckResult::pass(
            "Config",
            true,
            format!("No file at {config_path}, using defaults"),
        );
    }
    match read_config(config_path).and_then(|config| validate_config(&config)) {
        Ok(()) => CheckResult::pass("Config", true, format!("Found at {config_path}")),
        Err(e) => CheckResult::problem("Config", true, "Invalid", e.to_string()),
    }
}

// File, environment and flags combined, as every other command loads them.
fn check_effective_config(load_error: Option<&ConfigError>) -> CheckResult {
    match load_error {
        None => CheckResult::pass("Effective config", true, "Valid"),
        Some(e) => CheckResult::problem("Effective config", true, "Cannot be loaded", e.to_string()),
    }
}

fn check_api_key(config: &AppConfig) -> CheckResult {
    if config.llm.has_api_key() {
        CheckResult::pass("OpenAI API key", false, format!("Set (model {})", config.llm.model))
    } else {
        CheckResult::problem(
            "OpenAI API key",
            false,
            "Not set",
            "Set OPENAI_API_KEY to enable extraction, chat, canvas and Jira generation",
        )
    }
}

fn check_data_dir(data_dir: &Path) -> CheckResult {
    if let Err(e) = fs::create_dir_all(data_dir.join("activities")) {
        return CheckResult::problem(
            "Data dir",
            true,
            format!("Cannot create {}", data_dir.display()),
            e.to_string(),
        );
    }
    let marker = data_dir.join(".refineflow-doctor");
    match fs::write(&marker, b"ok").and_then(|_| fs::remove_file(&marker)) {
        Ok(()) => CheckResult::pass("Data dir", true, format!("Writable at {}", data_dir.display())),
        Err(e) => CheckResult::problem(
            "Data dir",
            true,
            format!("Not writable: {}", data_dir.display()),
            e.to_string(),
        ),
    }
}

fn check_index(db_path: &Path) -> CheckResult {
    match ActivityIndex::open(db_path).and_then(|index| index.search("", None)) {
        Ok(rows) => CheckResult::pass(
            "SQLite index",
            true,
            format!("{} activities indexed", rows.len()),
        ),
        Err(e) => CheckResult::problem(
            "SQLite index",
            true,
            format!("Cannot open {}", db_path.display()),
            format!("{e:#}"),
        ),
    }
}

fn check_editor_with<F>(editor_var: Option<String>, command_exists: F) -> CheckResult
where
    F: Fn(&str) -> bool,
{
    let Some(editor) = editor_var.filter(|e| !e.trim().is_empty()) else {
        return CheckResult::problem(
            "Editor",
            false,
            "VISUAL/EDITOR not set",
            "Entries will be read from stdin (finish with a line containing '.')",
        );
    };
    let program = editor.split_whitespace().next().unwrap_or_default();
    if command_exists(program) {
        CheckResult::pass("Editor", false, editor.clone())
    } else {
        CheckResult::problem(
            "Editor",
            false,
            format!("'{program}' not found in PATH"),
            "Fix VISUAL/EDITOR or unset it to use stdin input",
        )
    }
}

fn check_editor() -> CheckResult {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .ok();
    check_editor_with(editor, |name| which::which(name).is_ok())
}

/// `load_error` is set when the config could not be loaded; `config` then
/// holds the defaults and the failure shows up as a failed check.
pub fn run(
    config: &AppConfig,
    config_path: &str,
    load_error: Option<&ConfigError>,
) -> anyhow::Result<()> {
    println!("{}", "\nRefineFlow Doctor\n".bold());

    println!("{}", "Required:".bold());
    let file_check = check_config(config_path);
    let file_ok = matches!(file_check.status, CheckStatus::Pass);
    let mut results = vec![file_check];
    // A broken file already explains the load failure
    if file_ok {
        results.push(check_effective_config(load_error));
    }
    results.extend([check_data_dir(&config.data_dir()), check_index(&config.db_path())]);
    for result in &results {
        println!("{}", format_result(result));
    }

    println!("{}", "\nOptional:".bold());
    let optional = [check_api_key(config), check_editor()];
    for result in &optional {
        println!("{}", format_result(result));
    }
    results.extend(optional);

    println!();
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, CheckStatus::Fail))
        .count();
    let warnings = results
        .iter()
        .filter(|r| matches!(r.status, CheckStatus::Warn))
        .count();

    if failed > 0 {
        eprintln!("{}", format!("✗ {failed} required check(s) failed\n").red());
        std::process::exit(1);
    } else if warnings > 0 {
        println!(
            "{}",
            format!("! All required checks passed, {warnings} warning(s)").yellow()
        );
        println!(
            "{}",
            "  RefineFlow works, but LLM-backed features may be limited\n".green()
        );
    } else {
        println!("{}", "✓ All checks passed! RefineFlow is ready to use.\n".green());
    }

    Ok(())
}
