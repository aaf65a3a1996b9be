use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Source file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Sheet `{sheet}` not found in {} (available: {available})", .path.display())]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: String,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unknown month column: {0}")]
    UnknownMonthColumn(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Sheet `{0}` has no header row")]
    EmptySheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
