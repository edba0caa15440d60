//! Layered configuration for bookshelf.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults (platform data directory for the catalog).
//! 2. A config file: the one given explicitly, or `config.toml` in the
//!    platform config directory if it exists. TOML, YAML and JSON are
//!    recognised by extension.
//! 3. Environment variables prefixed `BOOKSHELF_`, e.g. `BOOKSHELF_DATABASE`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "BOOKSHELF_";
const DATABASE_FILE: &str = "catalog.sqlite";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite catalog file. Created on first use.
    pub database: PathBuf,
    /// Directory that search exports are written to.
    pub export_dir: PathBuf,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "bookshelf").ok_or_raise(|| ErrorKind::Directories)
}

impl Config {
    /// Built-in defaults, before any file or environment is applied.
    pub fn defaults() -> Result<Self> {
        Ok(Self {
            database: project_dirs()?.data_dir().join(DATABASE_FILE),
            export_dir: PathBuf::from("."),
        })
    }

    /// Load the configuration, reading `file` if given.
    ///
    /// An explicitly given file must exist. Without one, the default config
    /// file is used only if present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::defaults()?));
        match file {
            Some(file) => {
                // `Format::file` silently ignores missing files.
                if !file.is_file() {
                    exn::bail!(ErrorKind::Load);
                }
                figment = merge_file(figment, file)?;
            },
            None => {
                let default = project_dirs()?.config_dir().join(CONFIG_FILE);
                if default.is_file() {
                    figment = merge_file(figment, &default)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }
}

fn merge_file(figment: Figment, file: &Path) -> Result<Figment> {
    let extension = file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let figment = match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(file)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
        Some("json") => figment.merge(Json::file_exact(file)),
        _ => {
            exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf()));
        },
    };
    Ok(figment)
}
