//! Error types for AuthFlow

use thiserror::Error;

/// Result type alias using AuthFlow Error
pub type Result<T> = std::result::Result<T, Error>;

/// AuthFlow error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOTP error: {0}")]
    Totp(String),
}
