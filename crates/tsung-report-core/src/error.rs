use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Log contains no stats dump")]
    EmptyLog,

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown chart: {0}")]
    UnknownChart(String),
}

pub type Result<T> = std::result::Result<T, Error>;
