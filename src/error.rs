use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuadreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Cannot read workbook {path}: {message}")]
    WorkbookUnreadable { path: String, message: String },

    #[cfg_attr(feature = "xlsx", allow(dead_code))]
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No usable transactions found in {0}")]
    NoUsableData(String),

    #[error("Commission percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(f64),

    #[error("Header row is one-indexed and must be at least 1")]
    InvalidHeaderRow,

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, CuadreError>;
