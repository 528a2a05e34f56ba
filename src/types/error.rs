use thiserror::Error;

/// tmsdash error types
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Uploaded content cannot be opened as a spreadsheet
    #[error("workbook error: {0}")]
    Workbook(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tmsdash
pub type Result<T> = std::result::Result<T, DashboardError>;
