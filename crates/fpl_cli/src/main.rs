//! Squad optimizer CLI
//!
//! Thin wrapper over the fpl_core JSON API: each subcommand reads a
//! JSON request file and prints the response envelope.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fpl_core::{
    optimize_squad_json, plan_transfers_json, search_formation_json, select_captain_json,
};
use log::debug;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fpl")]
#[command(about = "Fantasy squad optimization and transfer planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a squad for one gameweek
    Optimize {
        /// Request JSON file: {"players": [...], "constraints": {...}}
        #[arg(long)]
        r#in: PathBuf,

        /// Write the response here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Solve every formation and report the best shape
    Formations {
        /// Request JSON file: {"players": [...], "constraints": {...}}
        #[arg(long)]
        r#in: PathBuf,

        /// Write the response here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Rank captain options for a chosen squad
    Captain {
        /// Request JSON file: {"players": [...], "squad_ids": [...]}
        #[arg(long)]
        r#in: PathBuf,

        /// Write the response here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Plan transfers over a multi-gameweek horizon
    Plan {
        /// Request JSON file: {"current_squad": [...], "pool": [...]}
        #[arg(long)]
        r#in: PathBuf,

        /// Write the response here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (input, out, handler): (PathBuf, Option<PathBuf>, fn(&str) -> String) = match cli.command {
        Commands::Optimize { r#in, out } => (r#in, out, optimize_squad_json),
        Commands::Formations { r#in, out } => (r#in, out, search_formation_json),
        Commands::Captain { r#in, out } => (r#in, out, select_captain_json),
        Commands::Plan { r#in, out } => (r#in, out, plan_transfers_json),
    };

    let request = fs::read_to_string(&input)
        .with_context(|| format!("failed to read request file {}", input.display()))?;
    debug!("request: {} bytes from {}", request.len(), input.display());

    let response = handler(&request);
    let pretty = prettify(&response);

    match out {
        Some(path) => fs::write(&path, pretty)
            .with_context(|| format!("failed to write response to {}", path.display()))?,
        None => println!("{}", pretty),
    }
    Ok(())
}

/// Re-indent the envelope for human eyes; fall back to the raw string
/// if it is somehow not valid JSON.
fn prettify(response: &str) -> String {
    serde_json::from_str::<serde_json::Value>(response)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| response.to_string())
}
