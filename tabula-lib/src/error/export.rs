//! Export error types

/// Errors raised while exporting grid rows.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("exported text is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("CSV writer flush failed: {0}")]
    Flush(String),
    #[error("exporter '{0}' is not installed on a grid")]
    Detached(String),
}
