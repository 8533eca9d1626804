//! Merge request migration.
//!
//! A pull request needs two branches on the destination: the head at the
//! merge request's last commit and the base at the commit it was compared to.

use super::{MigrateError, Migrator};
use crate::destination::{list_all_issues, DestinationState, NewPullRequest};
use crate::reconcile::TitleIndex;
use crate::source::{MergeRequestState, SourceMergeRequest};
use crate::summary::{ItemOutcome, PhaseSummary};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Returns true for merge requests that can be re-created.
///
/// Closed and locked requests may point at commits that are no longer reachable.
#[must_use]
pub fn is_eligible(merge_request: &SourceMergeRequest) -> bool {
    matches!(
        merge_request.state,
        MergeRequestState::Opened | MergeRequestState::Merged
    )
}

/// Returns the `(base, head)` branch names for a merge request.
#[must_use]
pub fn branch_names(merge_request: &SourceMergeRequest) -> (String, String) {
    (
        format!(
            "MR{}-{}-base",
            merge_request.iid, merge_request.target_branch
        ),
        format!(
            "MR{}-{}-head",
            merge_request.iid, merge_request.source_branch
        ),
    )
}

/// Picks the merge commit parent that is not the head commit.
///
/// Only defined when exactly one such parent exists; octopus merges yield `None`.
#[must_use]
pub fn resolve_base_parent(head_sha: &str, parent_ids: &[String]) -> Option<String> {
    match parent_ids
        .iter()
        .filter(|parent| parent.as_str() != head_sha)
        .collect::<Vec<_>>()
        .as_slice()
    {
        [parent] => Some((*parent).clone()),
        _ => None,
    }
}

impl Migrator<'_> {
    /// Re-creates open and merged merge requests as pull requests.
    ///
    /// Notes are transferred onto new pull requests, and pull requests whose
    /// source was merged are closed.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError`] if the merge requests or the destination pull
    /// requests cannot be listed.
    pub async fn migrate_merge_requests(&self) -> Result<PhaseSummary, MigrateError> {
        let span = info_span!("merge_requests", project_id = self.project_id);

        async {
            let mut merge_requests = self
                .source
                .merge_requests(self.project_id)
                .await
                .map_err(MigrateError::gitlab("merge requests"))?;
            merge_requests.sort_by_key(|merge_request| merge_request.id);

            let existing = list_all_issues(self.destination)
                .await
                .map_err(MigrateError::github("pull requests"))?;
            let mut index = TitleIndex::new(
                existing
                    .into_iter()
                    .filter(|issue| issue.is_pull_request)
                    .map(|pull| (pull.title.clone(), (pull.number, pull.state))),
            );
            debug!(existing = index.len(), "Fetched destination snapshot");

            let mut summary = PhaseSummary::default();
            for merge_request in &merge_requests {
                if !is_eligible(merge_request) {
                    info!(
                        iid = merge_request.iid,
                        state = merge_request.state.as_str(),
                        "Skipping"
                    );
                    summary.record(ItemOutcome::Skipped);
                    continue;
                }

                if let Some(&(number, state)) = index.get(&merge_request.title) {
                    info!(iid = merge_request.iid, title = %merge_request.title, "Already exists");
                    summary.record(ItemOutcome::Existing);
                    if merge_request.state == MergeRequestState::Merged
                        && state == DestinationState::Open
                    {
                        self.close(number).await;
                    }
                    continue;
                }

                info!(iid = merge_request.iid, title = %merge_request.title, "Creating");
                match self.create_pull_request(merge_request).await {
                    Some((number, comments)) => {
                        summary.record(ItemOutcome::Created);
                        summary.comments += comments;
                        index.insert(&merge_request.title, (number, DestinationState::Open));
                    }
                    None => summary.record(ItemOutcome::Failed),
                }
            }

            info!(
                created = summary.created,
                existing = summary.existing,
                skipped = summary.skipped,
                failed = summary.failed,
                "Merge requests done"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Creates the branches and the pull request for one merge request.
    ///
    /// Returns the pull request number and the number of transferred
    /// comments, or `None` if the pull request could not be created.
    async fn create_pull_request(
        &self,
        merge_request: &SourceMergeRequest,
    ) -> Option<(u64, usize)> {
        let (base, head) = branch_names(merge_request);

        match merge_request.sha.as_deref() {
            Some(head_sha) => self.create_branch(&head, head_sha).await,
            None => warn!(iid = merge_request.iid, "Merge request has no head commit"),
        }
        match self.base_sha(merge_request).await {
            Some(base_sha) => self.create_branch(&base, &base_sha).await,
            None => warn!(iid = merge_request.iid, "Could not resolve base commit"),
        }

        let description = merge_request.description.as_deref().unwrap_or_default();
        let pull = NewPullRequest {
            title: merge_request.title.clone(),
            body: self.transformer.transform(description, merge_request),
            head,
            base,
        };
        let created = match self.destination.create_pull_request(&pull).await {
            Ok(created) => created,
            Err(e) => {
                error!(
                    iid = merge_request.iid,
                    title = %merge_request.title,
                    error = %e,
                    "Failed to create pull request"
                );
                return None;
            }
        };

        let comments = match self
            .source
            .merge_request_notes(self.project_id, merge_request.iid)
            .await
        {
            Ok(notes) => self.transfer_notes(created.number, notes).await,
            Err(e) => {
                error!(iid = merge_request.iid, error = %e, "Failed to list notes");
                0
            }
        };

        if merge_request.state == MergeRequestState::Merged {
            self.close(created.number).await;
        }

        Some((created.number, comments))
    }

    /// Resolves the commit the base branch should point at.
    ///
    /// Merged requests use the merge commit's other parent; open requests
    /// and merges without a merge commit use the recorded diff base.
    async fn base_sha(&self, merge_request: &SourceMergeRequest) -> Option<String> {
        let merge_commit = merge_request
            .merge_commit_sha
            .as_deref()
            .filter(|_| merge_request.state == MergeRequestState::Merged);

        let Some(merge_commit) = merge_commit else {
            return self.diff_base(merge_request).await;
        };

        let head_sha = merge_request.sha.as_deref()?;
        match self.source.commit(self.project_id, merge_commit).await {
            Ok(commit) => resolve_base_parent(head_sha, &commit.parent_ids),
            Err(e) => {
                error!(iid = merge_request.iid, sha = merge_commit, error = %e, "Failed to fetch merge commit");
                None
            }
        }
    }

    /// Returns the recorded diff base, fetching the full merge request when
    /// the listing left the diff refs out.
    async fn diff_base(&self, merge_request: &SourceMergeRequest) -> Option<String> {
        if let Some(refs) = &merge_request.diff_refs {
            return refs.base_sha.clone();
        }

        match self
            .source
            .merge_request(self.project_id, merge_request.iid)
            .await
        {
            Ok(full) => full.diff_refs.and_then(|refs| refs.base_sha),
            Err(e) => {
                error!(iid = merge_request.iid, error = %e, "Failed to fetch merge request");
                None
            }
        }
    }

    /// Creates a branch, tolerating one that already exists.
    async fn create_branch(&self, name: &str, sha: &str) {
        match self.destination.create_branch(name, sha).await {
            Ok(()) => info!(branch = name, sha, "Created branch"),
            Err(e) if e.is_already_exists() => info!(branch = name, "Branch already exists"),
            Err(e) => error!(branch = name, error = %e, "Failed to create branch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge_request(state: MergeRequestState) -> SourceMergeRequest {
        SourceMergeRequest {
            id: 40,
            iid: 4,
            title: "Add parser".to_string(),
            description: None,
            state,
            source_branch: "feature/parser".to_string(),
            target_branch: "main".to_string(),
            sha: Some("head".to_string()),
            merge_commit_sha: None,
            diff_refs: None,
            author: None,
            created_at: None,
        }
    }

    #[test]
    fn only_open_and_merged_are_eligible() {
        assert!(is_eligible(&merge_request(MergeRequestState::Opened)));
        assert!(is_eligible(&merge_request(MergeRequestState::Merged)));
        assert!(!is_eligible(&merge_request(MergeRequestState::Closed)));
        assert!(!is_eligible(&merge_request(MergeRequestState::Locked)));
    }

    #[test]
    fn names_branches_after_iid_and_refs() {
        let (base, head) = branch_names(&merge_request(MergeRequestState::Opened));

        assert_eq!(base, "MR4-main-base");
        assert_eq!(head, "MR4-feature/parser-head");
    }

    #[test]
    fn resolves_other_parent_of_two_parent_merge() {
        let parents = ["base".to_string(), "head".to_string()];

        assert_eq!(resolve_base_parent("head", &parents), Some("base".to_string()));
    }

    #[test]
    fn octopus_merges_have_no_base() {
        let parents = ["a".to_string(), "b".to_string(), "head".to_string()];

        assert_eq!(resolve_base_parent("head", &parents), None);
        assert_eq!(resolve_base_parent("head", &[]), None);
    }
}
