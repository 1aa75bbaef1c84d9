//! Error types for cloudx-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] cloudx_config::ConfigError),

    #[error(transparent)]
    Api(#[from] cloudx_api::ApiError),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
