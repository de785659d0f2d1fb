use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read input file {}: {source}", path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write output file {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Duplicate secondary codes in the code table: {}", .0.join(", "))]
    Configuration(Vec<String>),

    #[error("Not a decimal amount: {0:?}")]
    InvalidAmount(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ReconError {
    fn from(e: serde_json::Error) -> Self {
        ReconError::Settings(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
