//! GitHub API error types.

use thiserror::Error;

/// Errors that can occur while listing repositories. All of them are fatal
/// to a run.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ListError {
    /// Classify an HTTP status code and response body into a typed error.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            Self::Authentication(format!("{}: {}", status, body.trim()))
        } else {
            Self::Api(format!("{}: {}", status, body.trim()))
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

impl From<reqwest::Error> for ListError {
    fn from(err: reqwest::Error) -> Self {
        match err.is_decode() {
            true => Self::Decode(err.to_string()),
            false => Self::Network(err.to_string()),
        }
    }
}
