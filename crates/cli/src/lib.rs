//! # Forge CLI
//!
//! Command-line interface for SchemaForge.
//!
//! Works with diagrams offline (export, edges, search, check) and with the
//! project backend (list, show, delete, pull, push, migrate).
//!
//! ## Commands
//!
//! - `projects list|show|delete` - Manage backend projects
//! - `diagram pull|push` - Move a project between the backend and a local file
//! - `diagram export|edges|search|check` - Work on a local project or export file
//! - `migrate` - Generate a migration from a project's class model
//!

pub mod commands;
pub mod output;

pub use commands::Outcome;

use anyhow::Result;
use clap::{Parser, Subcommand};
use forge_api::{ApiClient, ApiConfig, DEFAULT_LIMIT, DEFAULT_SKIP};
use forge_ir::{EXPORT_FILE_NAME, ProjectId};
use std::path::PathBuf;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "schemaforge", version)]
#[command(about = "Check, export and sync SchemaForge diagrams", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL (falls back to NEXT_PUBLIC_API_URL, then http://127.0.0.1:8000)
    #[arg(long, global = true, env = "SCHEMAFORGE_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Backend settings from flags and environment
    pub fn api_config(&self) -> ApiConfig {
        let config = match &self.api_url {
            Some(url) => ApiConfig::new().with_base_url(url.as_str()),
            None => ApiConfig::from_env(),
        };
        config.with_timeout(self.timeout)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage backend projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Work with a project's diagram
    #[command(subcommand)]
    Diagram(DiagramCommand),

    /// Generate a migration from a project's class model
    Migrate {
        /// Project id
        id: ProjectId,

        /// Migration message
        #[arg(short, long)]
        message: String,

        /// Class changed since the last migration (repeatable)
        #[arg(long = "class", value_name = "NAME")]
        classes: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List projects
    List {
        #[arg(long, default_value_t = DEFAULT_SKIP)]
        skip: u32,

        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },

    /// Show one project
    Show { id: ProjectId },

    /// Delete a project
    Delete { id: ProjectId },
}

#[derive(Debug, Subcommand)]
pub enum DiagramCommand {
    /// Fetch a project and save it as a local JSON file
    Pull {
        id: ProjectId,

        /// Output file (defaults to the project name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the diagram export file with freshly derived edges
    Export {
        /// Project or export JSON file
        file: PathBuf,

        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },

    /// Print derived relationships and unresolved foreign keys
    Edges { file: PathBuf },

    /// List classes whose name contains QUERY
    Search { file: PathBuf, query: Option<String> },

    /// Validate a project or export file
    Check { file: PathBuf },

    /// Save a local project's diagram to the backend
    Push { file: PathBuf },
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<Outcome> {
    let config = cli.api_config();
    let client = || ApiClient::new(config.clone());

    match cli.command {
        Commands::Projects(command) => {
            let client = client()?;
            match command {
                ProjectsCommand::List { skip, limit } => {
                    commands::list_projects(&client, skip, limit).await
                }
                ProjectsCommand::Show { id } => commands::show_project(&client, &id).await,
                ProjectsCommand::Delete { id } => commands::delete_project(&client, &id).await,
            }
        }
        Commands::Diagram(command) => match command {
            DiagramCommand::Pull { id, output } => commands::pull(&client()?, &id, output).await,
            DiagramCommand::Export { file, output } => commands::export(&file, &output),
            DiagramCommand::Edges { file } => commands::edges(&file),
            DiagramCommand::Search { file, query } => commands::search(&file, query.as_deref()),
            DiagramCommand::Check { file } => commands::check(&file),
            DiagramCommand::Push { file } => commands::push(&client()?, &file).await,
        },
        Commands::Migrate {
            id,
            message,
            classes,
        } => commands::migrate(&client()?, &id, &message, &classes).await,
    }
}
