//! Issue and comment migration.

use super::{map_assignee, MigrateError, Migrator, ATTACHMENT_LABEL};
use crate::destination::{list_all_issues, DestinationIssue, DestinationState, NewIssue};
use crate::reconcile::TitleIndex;
use crate::source::{IssueState, SourceIssue};
use crate::summary::{ItemOutcome, PhaseSummary};
use crate::transform::has_attachment;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Title prefix of placeholder issues, followed by the missing iid.
pub const PLACEHOLDER_TITLE_PREFIX: &str = "Placeholder for deleted issue #";

/// Body of placeholder issues.
pub const PLACEHOLDER_BODY: &str =
    "This issue was deleted on GitLab. It exists to keep issue numbers aligned with the source project.";

/// Builds the closed placeholder standing in for deleted issue `iid`.
#[must_use]
pub fn placeholder_issue(iid: u64) -> SourceIssue {
    SourceIssue {
        id: 0,
        iid,
        title: format!("{PLACEHOLDER_TITLE_PREFIX}{iid}"),
        description: Some(PLACEHOLDER_BODY.to_string()),
        author: None,
        created_at: None,
        state: IssueState::Closed,
        assignee: None,
        milestone: None,
        labels: Vec::new(),
        placeholder: true,
    }
}

/// Sorts `issues` by iid and inserts a placeholder for every missing iid from 1 up.
#[must_use]
pub fn fill_gaps(mut issues: Vec<SourceIssue>) -> Vec<SourceIssue> {
    issues.sort_by_key(|issue| issue.iid);

    let mut filled = Vec::with_capacity(issues.len());
    let mut next_iid = 1;
    for issue in issues {
        while next_iid < issue.iid {
            filled.push(placeholder_issue(next_iid));
            next_iid += 1;
        }
        next_iid = issue.iid + 1;
        filled.push(issue);
    }
    filled
}

impl Migrator<'_> {
    /// Creates missing issues with their comments, then closes those closed on the source.
    ///
    /// Deleted source issues are replaced by placeholders so destination
    /// numbers keep following source iids. Issues that already exist only get
    /// their state fixed; a closed destination issue is never reopened.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError`] if the milestones, the source issues or the
    /// destination issues cannot be listed.
    pub async fn migrate_issues(&self) -> Result<PhaseSummary, MigrateError> {
        let span = info_span!("issues", project_id = self.project_id);

        async {
            let milestones = self
                .destination
                .milestones()
                .await
                .map_err(MigrateError::github("milestones"))?;
            let milestones = TitleIndex::new(
                milestones
                    .into_iter()
                    .map(|milestone| (milestone.title, milestone.number)),
            );

            let issues = self
                .source
                .issues(self.project_id)
                .await
                .map_err(MigrateError::gitlab("issues"))?;

            let existing = list_all_issues(self.destination)
                .await
                .map_err(MigrateError::github("issues"))?;
            let mut index = TitleIndex::new(
                existing
                    .into_iter()
                    .filter(|issue| !issue.is_pull_request)
                    .map(|issue| (issue.title.clone(), issue)),
            );
            debug!(existing = index.len(), "Fetched destination snapshot");

            let mut summary = PhaseSummary::default();
            for issue in fill_gaps(issues) {
                if let Some(existing) = index.get(&issue.title) {
                    info!(iid = issue.iid, title = %issue.title, "Already exists");
                    summary.record(ItemOutcome::Existing);
                    if issue.is_closed() && existing.state == DestinationState::Open {
                        self.close(existing.number).await;
                    }
                    continue;
                }

                info!(iid = issue.iid, title = %issue.title, "Creating");
                match self.create_issue(&issue, &milestones).await {
                    Some((created, comments)) => {
                        summary.record(ItemOutcome::Created);
                        summary.comments += comments;
                        let title = created.title.clone();
                        index.insert(&title, created);
                    }
                    None => summary.record(ItemOutcome::Failed),
                }
            }

            info!(
                created = summary.created,
                existing = summary.existing,
                failed = summary.failed,
                comments = summary.comments,
                "Issues done"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Builds the destination payload for a source issue.
    fn new_issue(&self, issue: &SourceIssue, milestones: &TitleIndex<u64>) -> NewIssue {
        let description = issue.description.as_deref().unwrap_or_default();
        let body = self.transformer.transform(description, issue);

        let mut labels: Vec<String> = issue
            .labels
            .iter()
            .map(|label| self.label_name(label))
            .collect();
        if has_attachment(&body) && !labels.iter().any(|label| label == ATTACHMENT_LABEL) {
            labels.push(ATTACHMENT_LABEL.to_string());
        }

        NewIssue {
            title: issue.title.clone(),
            body,
            labels,
            assignees: map_assignee(issue.assignee.as_ref(), self.settings)
                .into_iter()
                .collect(),
            milestone: issue
                .milestone
                .as_ref()
                .and_then(|milestone| milestones.get(&milestone.title).copied()),
        }
    }

    /// Creates one issue, transfers its notes and applies its closed state.
    ///
    /// Returns the created issue and the number of transferred comments, or
    /// `None` if creation failed.
    async fn create_issue(
        &self,
        issue: &SourceIssue,
        milestones: &TitleIndex<u64>,
    ) -> Option<(DestinationIssue, usize)> {
        if let Err(e) = self.destination.wait_for_quota().await {
            warn!(error = %e, "Failed to check rate limit, continuing");
        }

        let created = match self
            .destination
            .create_issue(&self.new_issue(issue, milestones))
            .await
        {
            Ok(created) => created,
            Err(e) => {
                error!(iid = issue.iid, title = %issue.title, error = %e, "Failed to create issue");
                return None;
            }
        };

        if created.number != issue.iid {
            warn!(
                iid = issue.iid,
                number = created.number,
                "Destination number differs from source iid"
            );
        }

        let comments = if issue.placeholder {
            0
        } else {
            match self.source.issue_notes(self.project_id, issue.iid).await {
                Ok(notes) => self.transfer_notes(created.number, notes).await,
                Err(e) => {
                    error!(iid = issue.iid, error = %e, "Failed to list notes");
                    0
                }
            }
        };

        if issue.is_closed() {
            self.close(created.number).await;
        }

        Some((created, comments))
    }

    /// Closes destination item `number`, logging failures.
    pub(super) async fn close(&self, number: u64) {
        info!(number, "Closing");
        if let Err(e) = self.destination.close_issue(number).await {
            error!(number, error = %e, "Failed to close");
        }
    }
}
