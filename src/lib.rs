pub mod cli;
pub mod client;
pub mod config;
pub mod help;
pub mod history;
pub mod host;
pub mod project;
pub mod utils;
pub mod validation;

pub use crate::history::{VersionLedger, VersionsFetcher};
pub use crate::validation::ProjectValidator;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartosyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Project error: {0}")]
    Project(String),

    #[error("History error: {0}")]
    History(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CartosyncError>;
