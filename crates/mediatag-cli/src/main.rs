//! Mediatag CLI: upload, list, search and delete assets in-process.
//!
//! Reads the same environment as the API server (`.env` is honored).

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediatag_cli::{init_tracing, DeleteReport};
use mediatag_core::Config;
use mediatag_services::build_library;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mediatag", about = "Upload and auto-tag media files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload and tag a local file
    Upload {
        /// Path to the file to upload
        path: std::path::PathBuf,
    },
    /// List every catalogued asset
    List,
    /// Find assets by tag or file name
    Search {
        /// Case-insensitive substring
        query: String,
    },
    /// Delete an asset by storage key
    Delete {
        key: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let library = build_library(&config).await?;

    match cli.command {
        Commands::Upload { path } => {
            let asset = library.upload_and_tag(&path).await?;
            print_json(&asset)?;
        }
        Commands::List => {
            let assets = library.list_catalog().await?;
            print_json(&assets)?;
        }
        Commands::Search { query } => {
            if query.trim().is_empty() {
                anyhow::bail!("Search query must not be empty");
            }
            let assets = library.search_catalog(&query).await?;
            print_json(&assets)?;
        }
        Commands::Delete { key } => {
            let report = DeleteReport::new(&key, library.delete_asset(&key).await);
            print_json(&report)?;
            if !report.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
