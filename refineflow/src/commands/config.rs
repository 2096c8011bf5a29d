//! Config command - Show or edit the resolved configuration

use colored::Colorize;
use std::path::Path;
use std::process::Command;

use crate::config::loader::write_config;
use crate::config::ConfigError;
use crate::types::{AppConfig, PathConfig};

const ENV_OVERRIDES: [&str; 6] = [
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "REFINEFLOW_LLM_BASE_URL",
    "REFINEFLOW_DATA_DIR",
    "REFINEFLOW_LOG_LEVEL",
    "REFINEFLOW_LOG_FORMAT",
];

/// `load_error` is why the config could not be loaded; `config` then holds
/// the defaults.
pub fn run(
    config: &AppConfig,
    paths: &PathConfig,
    edit: bool,
    load_error: Option<&ConfigError>,
) -> anyhow::Result<()> {
    if edit {
        return edit_config(&paths.config_path);
    }

    println!("{}", "\nRefineFlow Configuration\n".bold());
    if let Some(e) = load_error {
        println!("{} {}", "✗".red(), e.to_string().red());
        println!(
            "{}\n",
            "  Showing defaults. Run 'refineflow config --edit' to fix it.".dimmed()
        );
    }

    println!("{}", "Config location:".dimmed());
    if Path::new(&paths.config_path).exists() {
        println!(
            "  {} {} ({:?})",
            "●".green(),
            paths.config_path,
            paths.config_type
        );
    } else {
        println!(
            "  {} {} (not found, using defaults)",
            "○".yellow(),
            paths.config_path
        );
    }

    println!("{}", "\nEffective settings:".dimmed());
    let api_key = if config.llm.has_api_key() {
        "set".green()
    } else {
        "not set".yellow()
    };
    println!("  llm.model:           {}", config.llm.model.cyan());
    println!("  llm.base_url:        {}", config.llm.base_url.cyan());
    println!("  llm.api_key:         {}", api_key);
    println!(
        "  llm.temperature:     {}",
        config.llm.temperature.to_string().cyan()
    );
    println!(
        "  llm.timeout_seconds: {}",
        config.llm.timeout_seconds.to_string().cyan()
    );
    println!(
        "  storage.data_dir:    {}",
        config.data_dir().display().to_string().cyan()
    );
    println!("  logging.level:       {}", config.logging.level.cyan());
    println!(
        "  logging.format:      {}",
        config.logging.format.to_string().cyan()
    );

    println!("{}", "\nEnvironment overrides:".dimmed());
    let mut has_overrides = false;
    for var in ENV_OVERRIDES {
        if let Ok(val) = std::env::var(var) {
            let shown = if var == "OPENAI_API_KEY" {
                "[REDACTED]".to_string()
            } else {
                val
            };
            println!("  {}={}", var, shown.yellow());
            has_overrides = true;
        }
    }
    if !has_overrides {
        println!("  {}", "(none)".dimmed());
    }
    println!();

    Ok(())
}

/// Open the config in `$VISUAL`/`$EDITOR`, seeding it with the defaults
/// when it does not exist yet.
fn edit_config(config_path: &str) -> anyhow::Result<()> {
    if !Path::new(config_path).exists() {
        write_config(config_path, &AppConfig::default())?;
        println!(
            "{}",
            format!("Created {} with default settings", config_path).green()
        );
    }

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    println!(
        "{}",
        format!("Opening {} in {}...\n", config_path, editor).dimmed()
    );

    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    let status = Command::new(program).args(parts).arg(config_path).status();

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => anyhow::bail!("Editor {} exited with error", editor),
        Err(e) => anyhow::bail!(
            "Failed to open editor {}: {}. Set EDITOR or VISUAL to your preferred editor",
            editor,
            e
        ),
    }
}
