//! Destination wrapper that logs writes instead of sending them.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

use super::error::GitHubError;
use super::types::{
    DestinationIssue, DestinationMilestone, DestinationState, NewIssue, NewLabel, NewMilestone,
    NewPullRequest,
};
use super::DestinationApi;

/// Forwards reads to `inner` and turns every write into a log line.
///
/// Created issues and pull requests receive numbers continuing after the
/// highest number seen in listings, mirroring how GitHub allocates them.
pub struct DryRunDestination<'a> {
    inner: &'a dyn DestinationApi,
    last_number: Mutex<u64>,
    milestone_count: Mutex<u64>,
}

impl<'a> DryRunDestination<'a> {
    /// Wraps `inner`.
    pub fn new(inner: &'a dyn DestinationApi) -> Self {
        Self {
            inner,
            last_number: Mutex::new(0),
            milestone_count: Mutex::new(0),
        }
    }

    fn observe(&self, number: u64) {
        let mut last = self.last_number.lock().unwrap_or_else(|e| e.into_inner());
        *last = (*last).max(number);
    }

    fn allocate(&self) -> u64 {
        let mut last = self.last_number.lock().unwrap_or_else(|e| e.into_inner());
        *last += 1;
        *last
    }
}

#[async_trait]
impl DestinationApi for DryRunDestination<'_> {
    async fn milestones(&self) -> Result<Vec<DestinationMilestone>, GitHubError> {
        let milestones = self.inner.milestones().await?;
        let mut count = self.milestone_count.lock().unwrap_or_else(|e| e.into_inner());
        *count = (*count).max(milestones.iter().map(|m| m.number).max().unwrap_or(0));
        Ok(milestones)
    }

    async fn create_milestone(
        &self,
        milestone: &NewMilestone,
    ) -> Result<DestinationMilestone, GitHubError> {
        info!(title = %milestone.title, state = ?milestone.state, "[DRY RUN] Would create milestone");
        let mut count = self.milestone_count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        Ok(DestinationMilestone {
            number: *count,
            title: milestone.title.clone(),
        })
    }

    async fn label_names(&self) -> Result<Vec<String>, GitHubError> {
        self.inner.label_names().await
    }

    async fn create_label(&self, label: &NewLabel) -> Result<(), GitHubError> {
        info!(name = %label.name, color = %label.color, "[DRY RUN] Would create label");
        Ok(())
    }

    async fn issues_page(
        &self,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<DestinationIssue>, GitHubError> {
        let issues = self.inner.issues_page(page, per_page).await?;
        for issue in &issues {
            self.observe(issue.number);
        }
        Ok(issues)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<DestinationIssue, GitHubError> {
        let number = self.allocate();
        info!(
            number,
            title = %issue.title,
            labels = ?issue.labels,
            assignees = ?issue.assignees,
            "[DRY RUN] Would create issue"
        );
        Ok(DestinationIssue {
            number,
            title: issue.title.clone(),
            state: DestinationState::Open,
            is_pull_request: false,
        })
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), GitHubError> {
        info!(number, length = body.len(), "[DRY RUN] Would create comment");
        Ok(())
    }

    async fn close_issue(&self, number: u64) -> Result<(), GitHubError> {
        info!(number, "[DRY RUN] Would close");
        Ok(())
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<(), GitHubError> {
        info!(branch = %name, sha = %sha, "[DRY RUN] Would create branch");
        Ok(())
    }

    async fn create_pull_request(
        &self,
        pull: &NewPullRequest,
    ) -> Result<DestinationIssue, GitHubError> {
        let number = self.allocate();
        info!(
            number,
            title = %pull.title,
            head = %pull.head,
            base = %pull.base,
            "[DRY RUN] Would create pull request"
        );
        Ok(DestinationIssue {
            number,
            title: pull.title.clone(),
            state: DestinationState::Open,
            is_pull_request: true,
        })
    }

    async fn wait_for_quota(&self) -> Result<(), GitHubError> {
        Ok(())
    }
}
