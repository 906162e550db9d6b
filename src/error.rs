use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reporter already finalized; a run may only end once")]
    AlreadyFinalized,

    #[error("Coverage source error: {0}")]
    Source(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CovReportError>;
