//! GitHub API error types.

use thiserror::Error;

/// Errors that can occur when writing to or reading from GitHub.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport, parsing or client construction failure.
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// The object (label, branch, ...) is already present.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// GitHub answered with an error status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl GitHubError {
    /// Returns true for conflicts that repeated runs are expected to hit.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// GitHub reports duplicate refs and labels as validation failures.
const UNPROCESSABLE_ENTITY: u16 = 422;

/// Classifies an octocrab error by inspecting the GitHub error payload.
///
/// Only a 422 whose message or error list says "already exists" is a conflict;
/// the same words under any other status are a rejection.
pub(crate) fn classify(error: octocrab::Error) -> GitHubError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let listed = source
                .errors
                .iter()
                .flatten()
                .map(|entry| entry.to_string().to_lowercase());
            let mut texts = std::iter::once(source.message.to_lowercase()).chain(listed);

            let conflict = status == UNPROCESSABLE_ENTITY
                && texts.any(|text| text.contains("already exists") || text.contains("already_exists"));

            if conflict {
                GitHubError::AlreadyExists(source.message.clone())
            } else {
                GitHubError::Rejected {
                    status,
                    message: source.message.clone(),
                }
            }
        }
        other => GitHubError::Api(other),
    }
}
