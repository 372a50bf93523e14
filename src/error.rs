use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("Failed to read {path}: {reason}")]
    Input { path: String, reason: String },
    #[error("Render task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
