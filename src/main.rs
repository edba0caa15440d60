mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use bookshelf_catalog::{Database, Repository};
use bookshelf_config::Config;
use clap::Parser;
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use time::UtcDateTime;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())))
        .with_writer(std::io::stderr)
        .init();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Catalog)?;
    }
    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Catalog)?;
    let result = match cli.command {
        Command::Import { file, dry_run } => import(&db, file, dry_run).await,
        Command::Search { filter, output } => search(&db, filter, output.unwrap_or(config.export_dir)).await,
        Command::Stats => stats(&db).await,
    };
    db.close().await;
    result
}

async fn import(db: &Database, file: PathBuf, dry_run: bool) -> Result<()> {
    let repo = Repository::new(db.pool().clone(), dry_run);
    let cancellation = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling import");
                cancellation.cancel();
            }
        }
    });
    let result = bookshelf_library::import_file(&file, &repo, &cancellation).await;
    ctrl_c.abort();
    let result = result.or_raise(|| ErrorKind::Import)?;
    if dry_run {
        println!("Dry run, nothing was written.");
    }
    println!("Added: {}", result.added);
    println!("Skipped duplicates: {}", result.skipped_duplicates);
    Ok(())
}

async fn search(db: &Database, filter: PathBuf, output: PathBuf) -> Result<()> {
    let filter = bookshelf_library::read_filter(&filter).await.or_raise(|| ErrorKind::Search)?;
    let records = Repository::from(db).search(&filter).await.or_raise(|| ErrorKind::Search)?;
    let path = bookshelf_library::write_export(&records, &output, UtcDateTime::now())
        .await
        .or_raise(|| ErrorKind::Export)?;
    println!("Found {} book(s), exported to {}", records.len(), path.display());
    Ok(())
}

async fn stats(db: &Database) -> Result<()> {
    let counts = Repository::from(db).counts().await.or_raise(|| ErrorKind::Catalog)?;
    println!("Books: {}", counts.books);
    println!("Genres: {}", counts.genres);
    println!("Authors: {}", counts.authors);
    println!("Publishers: {}", counts.publishers);
    Ok(())
}
