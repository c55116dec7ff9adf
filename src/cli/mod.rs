pub mod history;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{default_config_path, load_config, Config};
use crate::Result;

#[derive(Parser)]
#[command(
    name = "cartosync",
    version,
    about = "Synchronize GIS projects with a cloud backend",
    long_about = "Cartosync inspects checked-out GIS projects: it pages through their \
                  cloud version history and validates the project layout for \
                  cloud-compatible editing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the cloud version history of a project
    History(history::HistoryArgs),

    /// Validate a project layout for cloud-compatible editing
    Validate(validate::ValidateArgs),
}

/// Resolve the effective configuration: explicit path, then the user config
/// file, then built-in defaults.
pub(crate) fn resolve_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path);
    }
    if let Some(default) = default_config_path() {
        if default.is_file() {
            return load_config(default);
        }
    }
    Ok(Config::default())
}
