//! GitLab API error types.

use thiserror::Error;

/// Errors that can occur when talking to the GitLab API.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist or is not visible.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Invalid response from {path}: {message}")]
    InvalidResponse { path: String, message: String },
}

impl GitLabError {
    /// Classifies a non-success status and its body into a typed error.
    pub fn from_status(status: reqwest::StatusCode, path: &str, body: String) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            Self::Unauthorized(format!("{status}: {body}"))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Self::NotFound(path.to_string())
        } else {
            Self::Api {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}
