use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] folio_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid field assignment '{0}', expected path=value")]
    InvalidAssignment(String),
    #[error("Media file has no usable name: {0}")]
    InvalidMediaPath(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
