pub mod app;
pub mod commands;
pub mod config;
pub mod export;
pub mod llm;
pub mod logging;
pub mod state;
pub mod storage;
pub mod timestamp;
pub mod types;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::app::App;
use crate::config::paths::resolve_paths;
use crate::types::{ActivityStatus, EntryType, ExportFormat, PathConfig, PathConfigType};

#[derive(Parser)]
#[command(
    name = "refineflow",
    version,
    about = "LLM-assisted activity refinement",
    long_about = "RefineFlow collects notes, transcripts and decisions about an activity, keeps a \
                  structured state of requirements, risks and open questions, and produces a \
                  Business Case Canvas and Jira-ready task breakdowns."
)]
struct Cli {
    /// Data directory (overrides config and REFINEFLOW_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Model name (overrides config and OPENAI_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Config file to use instead of the resolved one
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new activity interactively
    New,

    /// List activities
    List {
        /// Only activities with this status (in_progress, finalized)
        #[arg(short, long)]
        status: Option<ActivityStatus>,

        /// Search title, description and problem
        #[arg(long)]
        search: Option<String>,

        /// Rebuild the search index from the activity directories first
        #[arg(long)]
        reindex: bool,
    },

    /// Open the menu of one activity
    Open {
        slug: String,
    },

    /// Add information to an activity
    Add {
        slug: String,

        /// Entry type; classified automatically when omitted
        #[arg(short = 't', long = "type")]
        entry_type: Option<EntryType>,

        /// Entry text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the entry from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Ask questions about an activity
    Chat {
        slug: String,
    },

    /// Show open questions grouped by category
    Questions {
        slug: String,
    },

    /// Generate the Business Case Canvas
    Canvas {
        slug: String,

        /// Print the last generated canvas instead of regenerating
        #[arg(long)]
        show: bool,
    },

    /// Export Jira tasks
    Export {
        slug: String,

        #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
    },

    /// Validate the structure of a Jira export file
    Validate {
        file: PathBuf,
    },

    /// Finalize an activity
    Finalize {
        slug: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or edit configuration
    Config {
        /// Open config in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },

    /// Check configuration and environment
    Doctor,
}

fn config_paths(override_path: Option<&Path>) -> PathConfig {
    match override_path {
        Some(path) => PathConfig {
            config_type: PathConfigType::Local,
            config_path: path.to_string_lossy().to_string(),
        },
        None => resolve_paths(),
    }
}

fn build_app(config: types::AppConfig) -> App {
    match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Startup error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // config and doctor must still run when the config is broken
    let repairs_config = matches!(cli.command, Some(Command::Config { .. } | Command::Doctor));
    let (config, load_error) = config::load_app_config_or_default(
        cli.config.as_deref(),
        cli.data_dir.as_deref(),
        cli.model.as_deref(),
    );
    if let Some(e) = &load_error {
        if !repairs_config {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    }
    logging::init_tracing(&config.logging);

    let _ = ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(130);
    });

    match cli.command {
        None => {
            let app = build_app(config);
            if let Err(e) = commands::menu::run(&app) {
                eprintln!("Menu error: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(command) => match command {
            Command::New => {
                let app = build_app(config);
                if let Err(e) = commands::new::run(&app) {
                    eprintln!("New error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::List {
                status,
                search,
                reindex,
            } => {
                let app = build_app(config);
                if let Err(e) = commands::list::run(&app, status, search.as_deref(), reindex) {
                    eprintln!("List error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Open { slug } => {
                let app = build_app(config);
                if let Err(e) = commands::open::run(&app, &slug) {
                    eprintln!("Open error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Add {
                slug,
                entry_type,
                text,
                file,
            } => {
                let app = build_app(config);
                if let Err(e) = commands::add::run(
                    &app,
                    &slug,
                    entry_type,
                    text.as_deref(),
                    file.as_deref(),
                ) {
                    eprintln!("Add error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Chat { slug } => {
                let app = build_app(config);
                if let Err(e) = commands::chat::run(&app, &slug) {
                    eprintln!("Chat error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Questions { slug } => {
                let app = build_app(config);
                if let Err(e) = commands::questions::run(&app, &slug) {
                    eprintln!("Questions error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Canvas { slug, show } => {
                let app = build_app(config);
                let result = if show {
                    commands::canvas::show(&app, &slug)
                } else {
                    commands::canvas::run(&app, &slug)
                };
                if let Err(e) = result {
                    eprintln!("Canvas error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Export { slug, format } => {
                let app = build_app(config);
                if let Err(e) = commands::export::run(&app, &slug, format) {
                    eprintln!("Export error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Validate { file } => match commands::validate::run(&file) {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("Validate error: {:#}", e);
                    std::process::exit(1);
                }
            },
            Command::Finalize { slug, yes } => {
                let app = build_app(config);
                if let Err(e) = commands::finalize::run(&app, &slug, yes) {
                    eprintln!("Finalize error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Config { edit } => {
                let paths = config_paths(cli.config.as_deref());
                if let Err(e) = commands::config::run(&config, &paths, edit, load_error.as_ref()) {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(1);
                }
            }
            Command::Doctor => {
                let paths = config_paths(cli.config.as_deref());
                if let Err(e) =
                    commands::doctor::run(&config, &paths.config_path, load_error.as_ref())
                {
                    eprintln!("Doctor error: {:#}", e);
                    std::process::exit(1);
                }
            }
        },
    }
}
