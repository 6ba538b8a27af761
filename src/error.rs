use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid job duration: {0} hours (must be positive and finite)")]
    InvalidDuration(f64),

    #[error("State file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
