use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("browser error: {0}")]
    Browser(String),

    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("gave up on {url} after {attempts} attempts")]
    Unreachable { url: String, attempts: u32 },

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
