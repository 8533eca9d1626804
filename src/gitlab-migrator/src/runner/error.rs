//! Runner error types.

use crate::migrate::MigrateError;
use crate::summary::Phase;

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Settings loading and validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitLab client errors outside a phase.
    #[error(transparent)]
    GitLab(#[from] crate::source::GitLabError),

    /// GitHub client errors outside a phase.
    #[error(transparent)]
    GitHub(#[from] crate::destination::GitHubError),

    /// A user or project map produced an invalid pattern.
    #[error("Failed to compile reference patterns: {0}")]
    Transform(#[from] regex::Error),

    /// A phase could not read a collection it depends on.
    #[error("The {phase} phase failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: MigrateError,
    },
}
