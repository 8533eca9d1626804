//! Phase-blocking migration errors.

use crate::destination::GitHubError;
use crate::source::GitLabError;

/// A collection every later decision of a phase depends on could not be read.
///
/// Failures on single items never surface here; they are logged and counted.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Listing a source collection failed.
    #[error("Failed to list {what} on GitLab: {source}")]
    Source {
        what: &'static str,
        #[source]
        source: GitLabError,
    },

    /// Listing a destination collection failed.
    #[error("Failed to list {what} on GitHub: {source}")]
    Destination {
        what: &'static str,
        #[source]
        source: GitHubError,
    },
}

impl MigrateError {
    pub(crate) fn gitlab(what: &'static str) -> impl FnOnce(GitLabError) -> Self {
        move |source| Self::Source { what, source }
    }

    pub(crate) fn github(what: &'static str) -> impl FnOnce(GitHubError) -> Self {
        move |source| Self::Destination { what, source }
    }
}
