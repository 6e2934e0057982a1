//! Layered configuration for cardscan.
//!
//! Later layers override earlier ones:
//!
//! 1. builtin defaults;
//! 2. a configuration file: either the one given explicitly, or any of
//!    `config.{toml,yaml,yml,json}` in the platform config directory;
//! 3. environment variables prefixed `CARDSCAN_`, with `__` separating
//!    nested keys (`CARDSCAN_CACHE__VERSION=2`).

pub mod error;
mod models;

use crate::error::{ErrorKind, Result};
pub use crate::models::*;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CARDSCAN_";
const ENV_SEPARATOR: &str = "__";
const FILE_STEM: &str = "config";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cardscan")
}

/// Configuration files picked up when none is given explicitly.
pub fn default_files() -> Vec<PathBuf> {
    match project_dirs() {
        Some(dirs) => candidates(dirs.config_dir()),
        None => Vec::new(),
    }
}

fn candidates(directory: &Path) -> Vec<PathBuf> {
    EXTENSIONS.iter().map(|extension| directory.join(format!("{FILE_STEM}.{extension}"))).collect()
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

/// Build the layered figment from `files` (only those that exist are read).
pub fn figment(files: &[PathBuf]) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    for file in files.iter().filter(|file| file.is_file()) {
        tracing::debug!(file = %file.display(), "Reading configuration file");
        figment = merge_file(figment, file)?;
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR)))
}

impl Config {
    /// Load and validate the configuration. An `explicit` file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let files = match explicit {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::Unreadable(path.to_path_buf())),
            Some(path) => vec![path.to_path_buf()],
            None => default_files(),
        };
        Self::from_figment(&figment(&files)?)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Extract)?;
        config.validate()?;
        Ok(config)
    }
}
