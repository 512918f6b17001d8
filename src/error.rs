//! # Error Types
//!
//! Failures that can stop a lineup run before any matching happens, plus the
//! I/O and encoding failures of the exporter. Misses and declined
//! disambiguation prompts are *not* errors; they are collected in the
//! reconciliation result instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineupError {
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("The wanted list is empty. Provide a list file, a spreadsheet or inline text.")]
    EmptyList,

    #[error("Similarity threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("Failed to read list file {}: {source}", .path.display())]
    ListRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read spreadsheet {}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LineupError>;
