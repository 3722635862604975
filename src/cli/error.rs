//! CLI-specific error types

use crate::config::ConfigError;
use crate::import::ImportError;
use crate::model::LoaderError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    #[error("Loader error: {0}")]
    LoaderError(#[from] LoaderError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
}
