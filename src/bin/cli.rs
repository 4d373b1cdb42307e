//! Operator command-line surface for the CMS sync core

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use unicore_cms::commands::{self, import::ImportOptions, CommandContext};
use unicore_cms::config::{default_data_dir, AppConfig};
use unicore_cms::CmsError;

#[derive(Parser)]
#[command(name = "unicore-cms", about = "Universal Core CMS sync tooling", version)]
struct Cli {
    /// Data directory holding config, database, repository and index
    #[arg(long, env = "UNICORE_CMS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resync the content repository with the relational database
    ResyncDb,
    /// Resync the search index with the content repository
    ResyncIndex,
    /// Import relational rows from the content repository
    ImportFromStore {
        /// Run non-interactively with default answers
        #[arg(long)]
        quiet: bool,
    },
    /// Rewrite incorrect locale codes (swh -> swa, UK -> GB)
    FixLocaleCodes {
        /// Push the repository to its remote afterwards
        #[arg(long)]
        push: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.data_dir {
        Some(dir) => AppConfig::load_from(dir)?,
        None => AppConfig::load_from(&default_data_dir()?)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let ctx = CommandContext::init(config).await?;
    let mut out = io::stdout();

    let result = match cli.command {
        Commands::ResyncDb => commands::resync_db::run(&ctx, &mut out).await,
        Commands::ResyncIndex => commands::resync_index::run(&ctx, &mut out).await,
        Commands::ImportFromStore { quiet } => {
            let mut input = BufReader::new(io::stdin());
            commands::import::run(&ctx, &ImportOptions { quiet }, &mut input, &mut out)
                .await
                .map(|report| {
                    tracing::info!(
                        "Imported {} localisations, {} categories, {} posts ({} skipped)",
                        report.localisations,
                        report.categories,
                        report.posts,
                        report.skipped
                    );
                })
        }
        Commands::FixLocaleCodes { push } => commands::fix_locales::run(&ctx, push, &mut out).await,
    };

    match result {
        Ok(()) => Ok(()),
        // Lock contention gets its own exit code so wrappers can retry
        Err(CmsError::Locked(name)) => {
            eprintln!("Another '{name}' run is already in progress");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}
