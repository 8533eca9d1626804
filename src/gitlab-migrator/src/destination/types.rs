//! GitHub-side data types, both read back from and sent to the API.

use serde::{Deserialize, Serialize};

/// Open/closed state of a destination issue, pull request or milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationState {
    Open,
    Closed,
}

/// An existing milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationMilestone {
    pub number: u64,
    pub title: String,
}

/// An existing issue or pull request.
#[derive(Debug, Clone)]
pub struct DestinationIssue {
    pub number: u64,
    pub title: String,
    pub state: DestinationState,
    /// Pull requests are listed alongside issues and flagged here.
    pub is_pull_request: bool,
}

/// Milestone creation payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewMilestone {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: DestinationState,
    /// ISO-8601 timestamp at midnight UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
}

/// Label creation payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewLabel {
    pub name: String,
    /// Six hex digits without a leading `#`.
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Issue creation payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

/// Pull request creation payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    /// Branch holding the changes.
    pub head: String,
    /// Branch the changes would merge into.
    pub base: String,
}
