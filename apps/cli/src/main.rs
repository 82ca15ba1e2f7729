//! jsonviews - compile JSON view patterns, preview their rows, and manage design documents
//!
//! ```text
//! jsonviews check --view by_tag.json
//! jsonviews rows --view by_tag.json --docs posts.ndjson
//! jsonviews put --group blog --name by_tag --view by_tag.json
//! jsonviews list --group blog
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "jsonviews")]
#[command(about = "Compile JSON view patterns into index rows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./jsonviews.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Make the `minute` transform return the hour, as older views expect
    #[arg(long, global = true)]
    legacy_minute: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate a view, printing its normalised form
    Check {
        #[arg(long)]
        view: PathBuf,
    },

    /// Print the rows a view derives from documents, one JSON object per line
    Rows {
        #[arg(long)]
        view: PathBuf,

        /// JSON array or newline-delimited JSON (stdin when omitted)
        #[arg(long)]
        docs: Option<PathBuf>,
    },

    /// Add a view to a design document; fails if the name is taken
    Add {
        #[arg(long)]
        group: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        view: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Add or replace a view
    Put {
        #[arg(long)]
        group: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        view: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Remove a view; fails if it does not exist
    Remove {
        #[arg(long)]
        group: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// List the views of a design document
    List {
        #[arg(long)]
        group: String,
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    if cli.legacy_minute {
        config.compile.legacy_minute = true;
    }

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Check { view } => commands::check(&view).await,
        Commands::Rows { view, docs } => commands::rows(&config, &view, docs.as_deref()).await,
        Commands::Add {
            group,
            name,
            view,
            store,
        } => commands::add(&config, &group, &name, &view, store).await,
        Commands::Put {
            group,
            name,
            view,
            store,
        } => commands::put(&config, &group, &name, &view, store).await,
        Commands::Remove { group, name, store } => {
            commands::remove(&config, &group, &name, store).await
        }
        Commands::List { group, store } => commands::list(&config, &group, store).await,
    }
}
