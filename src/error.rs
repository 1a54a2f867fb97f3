//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Reference asset error: {0}")]
    Assets(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation worker failed: {0}")]
    Worker(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match err.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Assets(format!("Failed to walk asset directory {}", path)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
