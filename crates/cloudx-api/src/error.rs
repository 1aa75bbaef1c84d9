//! Error types for the container backend

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, unreadable body)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with `success: false`; the message is shown verbatim
    #[error("{0}")]
    Backend(String),

    /// The backend answered with something that is not the expected envelope
    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// True when the failure happened before the backend could answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
