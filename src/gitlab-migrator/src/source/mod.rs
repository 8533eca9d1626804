//! Source service (GitLab) access.
//!
//! The migrators only see the [`SourceApi`] trait; [`GitLabClient`] is the
//! production implementation.

mod client;
mod error;
mod types;

pub use client::GitLabClient;
pub use error::GitLabError;
pub use types::{
    DiffRefs, IssueState, MergeRequestState, MilestoneRef, SourceCommit, SourceIssue,
    SourceLabel, SourceMergeRequest, SourceMilestone, SourceNote, SourceProject, SourceUser,
};

use async_trait::async_trait;

/// Read-only view of a source project.
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Lists every project the token is a member of.
    async fn projects(&self) -> Result<Vec<SourceProject>, GitLabError>;

    /// Lists all milestones of a project.
    async fn milestones(&self, project_id: u64) -> Result<Vec<SourceMilestone>, GitLabError>;

    /// Lists all labels of a project.
    async fn labels(&self, project_id: u64) -> Result<Vec<SourceLabel>, GitLabError>;

    /// Lists all issues of a project, in any state.
    async fn issues(&self, project_id: u64) -> Result<Vec<SourceIssue>, GitLabError>;

    /// Lists all notes on one issue.
    async fn issue_notes(
        &self,
        project_id: u64,
        issue_iid: u64,
    ) -> Result<Vec<SourceNote>, GitLabError>;

    /// Lists all merge requests of a project, in any state.
    async fn merge_requests(&self, project_id: u64) -> Result<Vec<SourceMergeRequest>, GitLabError>;

    /// Fetches one merge request, including its diff refs.
    async fn merge_request(
        &self,
        project_id: u64,
        merge_request_iid: u64,
    ) -> Result<SourceMergeRequest, GitLabError>;

    /// Lists all notes on one merge request.
    async fn merge_request_notes(
        &self,
        project_id: u64,
        merge_request_iid: u64,
    ) -> Result<Vec<SourceNote>, GitLabError>;

    /// Fetches a single commit.
    async fn commit(&self, project_id: u64, sha: &str) -> Result<SourceCommit, GitLabError>;
}
