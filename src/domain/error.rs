use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter at least one valid URL")]
    InvalidInput,

    #[error("Error with {url}: {reason}")]
    DownloadFailure { url: String, reason: String },

    #[error("General error: {0}")]
    BatchFailure(String),

    #[error("I/O error: {0}")]
    Io(String),
}
