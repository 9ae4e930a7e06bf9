use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report has no sectors")]
    EmptyDataset,

    #[error("Sector not found: {0}")]
    SectorNotFound(String),

    #[error("Stock not found in report: {0}")]
    StockNotFound(String),

    #[error("Report store is empty")]
    EmptyStore,

    #[error("Fetching sector report failed: {0}")]
    FetchFailed(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
