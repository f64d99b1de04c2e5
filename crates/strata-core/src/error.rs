use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid commit hash: {0}")]
    InvalidCommitHash(String),
}
