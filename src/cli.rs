use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Import book listings into a deduplicated catalog, then search and export it.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Catalog database, overriding the configured one.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a .csv listing into the catalog.
    Import {
        file: PathBuf,
        /// Resolve and count everything, but write nothing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Search the catalog with a JSON filter and export the matches.
    Search {
        filter: PathBuf,
        /// Directory to write the export to, overriding the configured one.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show how many entities the catalog holds.
    Stats,
}

impl Cli {
    /// Default log directive when `RUST_LOG` isn't set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
