//! GitLab v4 API data types.
//!
//! Only the fields the migration reads are modelled; everything else in the
//! responses is ignored by serde.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// A GitLab user as embedded in issues, notes and merge requests.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
}

/// A project the token can access.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceProject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path_with_namespace: String,
    pub description: Option<String>,
}

/// A project milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceMilestone {
    /// Globally unique id, used as creation-order surrogate.
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    /// `active` or `closed`.
    pub state: String,
    pub due_date: Option<NaiveDate>,
}

/// A project label.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceLabel {
    pub name: String,
    /// Hex color with a leading `#`, e.g. `#fbca04`.
    pub color: String,
    pub description: Option<String>,
}

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[serde(alias = "open")]
    Opened,
    Closed,
}

/// Reference to the milestone an issue belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneRef {
    pub title: String,
}

/// A project issue.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceIssue {
    pub id: u64,
    /// Project-scoped sequence number.
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<SourceUser>,
    pub created_at: Option<DateTime<Utc>>,
    pub state: IssueState,
    pub assignee: Option<SourceUser>,
    pub milestone: Option<MilestoneRef>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Set on synthetic issues inserted to fill numbering gaps.
    #[serde(skip)]
    pub placeholder: bool,
}

impl SourceIssue {
    /// Returns true if the issue is closed in the source project.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }
}

/// A comment on an issue or merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceNote {
    pub id: u64,
    pub body: String,
    pub author: Option<SourceUser>,
    pub created_at: Option<DateTime<Utc>>,
}

/// State of a merge request.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    #[serde(alias = "open")]
    Opened,
    Closed,
    Merged,
    Locked,
}

impl MergeRequestState {
    /// Returns the state as GitLab spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Merged => "merged",
            Self::Locked => "locked",
        }
    }
}

/// Base/start/head SHAs of a merge request diff.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiffRefs {
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
    pub start_sha: Option<String>,
}

/// A project merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceMergeRequest {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: MergeRequestState,
    pub source_branch: String,
    pub target_branch: String,
    /// Head commit of the source branch.
    pub sha: Option<String>,
    pub merge_commit_sha: Option<String>,
    pub diff_refs: Option<DiffRefs>,
    pub author: Option<SourceUser>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A single commit, as needed to resolve merge parents.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceCommit {
    pub id: String,
    #[serde(default)]
    pub parent_ids: Vec<String>,
}
