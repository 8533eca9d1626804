//! Destination service (GitHub) access.
//!
//! Migrators write through the [`DestinationApi`] trait. [`GitHubClient`] talks
//! to GitHub; [`DryRunDestination`] wraps any implementation and only logs
//! the writes.

mod client;
mod dry_run;
mod error;
mod types;

pub use client::GitHubClient;
pub use dry_run::DryRunDestination;
pub use error::GitHubError;
pub use types::{
    DestinationIssue, DestinationMilestone, DestinationState, NewIssue, NewLabel, NewMilestone,
    NewPullRequest,
};

use async_trait::async_trait;

/// Page size used when listing destination issues.
pub const ISSUES_PER_PAGE: u8 = 100;

/// Read/write view of the destination repository.
#[async_trait]
pub trait DestinationApi: Send + Sync {
    /// Lists all milestones, open and closed.
    async fn milestones(&self) -> Result<Vec<DestinationMilestone>, GitHubError>;

    /// Creates a milestone.
    async fn create_milestone(
        &self,
        milestone: &NewMilestone,
    ) -> Result<DestinationMilestone, GitHubError>;

    /// Lists the names of all labels.
    async fn label_names(&self) -> Result<Vec<String>, GitHubError>;

    /// Creates a label.
    async fn create_label(&self, label: &NewLabel) -> Result<(), GitHubError>;

    /// Lists one page of issues and pull requests in any state, oldest first.
    async fn issues_page(&self, page: u32, per_page: u8)
        -> Result<Vec<DestinationIssue>, GitHubError>;

    /// Creates an issue.
    async fn create_issue(&self, issue: &NewIssue) -> Result<DestinationIssue, GitHubError>;

    /// Adds a comment to an issue or pull request.
    async fn create_comment(&self, number: u64, body: &str) -> Result<(), GitHubError>;

    /// Closes an issue or pull request.
    async fn close_issue(&self, number: u64) -> Result<(), GitHubError>;

    /// Creates branch `name` pointing at `sha`.
    async fn create_branch(&self, name: &str, sha: &str) -> Result<(), GitHubError>;

    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        pull: &NewPullRequest,
    ) -> Result<DestinationIssue, GitHubError>;

    /// Pauses until enough request quota is available.
    async fn wait_for_quota(&self) -> Result<(), GitHubError> {
        Ok(())
    }
}

/// Lists every issue and pull request, walking pages until a short or empty one.
///
/// # Errors
///
/// Returns the first listing error.
pub async fn list_all_issues(
    api: &dyn DestinationApi,
) -> Result<Vec<DestinationIssue>, GitHubError> {
    let mut all_issues = Vec::new();
    let mut page = 1;

    loop {
        let issues = api.issues_page(page, ISSUES_PER_PAGE).await?;
        let count = issues.len();
        all_issues.extend(issues);

        if count < usize::from(ISSUES_PER_PAGE) {
            break;
        }
        page += 1;
    }

    Ok(all_issues)
}
