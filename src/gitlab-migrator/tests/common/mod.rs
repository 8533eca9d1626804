//! In-memory source and destination used by the migration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gitlab_migrator::destination::{
    DestinationApi, DestinationIssue, DestinationMilestone, DestinationState, GitHubError,
    NewIssue, NewLabel, NewMilestone, NewPullRequest,
};
use gitlab_migrator::source::{
    GitLabError, IssueState, MergeRequestState, SourceApi, SourceCommit, SourceIssue,
    SourceLabel, SourceMergeRequest, SourceMilestone, SourceNote, SourceProject, SourceUser,
};
use gitlab_migrator::Settings;

pub const PROJECT_ID: u64 = 42;

pub fn settings() -> Settings {
    toml::from_str(
        r#"
        [gitlab]
        url = "https://gitlab.example.com"
        token = "glpat-test"
        project-id = 42

        [github]
        owner = "Org"
        repo = "Project"
        username = "migration-bot"
        token = "ghp_test"

        [usermap]
        jdoe = "john-doe"

        [projectmap]
        "group/project" = "Org/Project"
        "#,
    )
    .unwrap()
}

pub fn user(username: &str) -> SourceUser {
    SourceUser {
        id: 1,
        username: username.to_string(),
        name: username.to_string(),
    }
}

pub fn issue(iid: u64, title: &str) -> SourceIssue {
    SourceIssue {
        id: 1000 + iid,
        iid,
        title: title.to_string(),
        description: Some(format!("Body of {title}")),
        author: Some(user("jdoe")),
        created_at: Some(Utc.with_ymd_and_hms(2019, 1, 5, 14, 3, 0).unwrap()),
        state: IssueState::Opened,
        assignee: None,
        milestone: None,
        labels: Vec::new(),
        placeholder: false,
    }
}

pub fn note(id: u64, body: &str) -> SourceNote {
    SourceNote {
        id,
        body: body.to_string(),
        author: Some(user("jdoe")),
        created_at: Some(Utc.with_ymd_and_hms(2019, 1, 6, 9, 30, 0).unwrap()),
    }
}

pub fn merge_request(id: u64, iid: u64, title: &str, state: MergeRequestState) -> SourceMergeRequest {
    SourceMergeRequest {
        id,
        iid,
        title: title.to_string(),
        description: Some(format!("Changes for {title}")),
        state,
        source_branch: format!("feature-{iid}"),
        target_branch: "main".to_string(),
        sha: Some(format!("head{iid}")),
        merge_commit_sha: None,
        diff_refs: None,
        author: Some(user("jdoe")),
        created_at: Some(Utc.with_ymd_and_hms(2019, 2, 1, 8, 0, 0).unwrap()),
    }
}

pub fn label(name: &str, color: &str) -> SourceLabel {
    SourceLabel {
        name: name.to_string(),
        color: color.to_string(),
        description: None,
    }
}

pub fn milestone(id: u64, title: &str, state: &str) -> SourceMilestone {
    SourceMilestone {
        id,
        iid: id,
        title: title.to_string(),
        description: None,
        state: state.to_string(),
        due_date: None,
    }
}

/// Read-only source project.
#[derive(Default)]
pub struct FakeSource {
    pub projects: Vec<SourceProject>,
    pub milestones: Vec<SourceMilestone>,
    pub labels: Vec<SourceLabel>,
    pub issues: Vec<SourceIssue>,
    pub issue_notes: HashMap<u64, Vec<SourceNote>>,
    pub merge_requests: Vec<SourceMergeRequest>,
    pub merge_request_notes: HashMap<u64, Vec<SourceNote>>,
    pub commits: HashMap<String, SourceCommit>,
    /// Issue iids whose notes were requested.
    pub notes_requested: Mutex<Vec<u64>>,
}

#[async_trait]
impl SourceApi for FakeSource {
    async fn projects(&self) -> Result<Vec<SourceProject>, GitLabError> {
        Ok(self.projects.clone())
    }

    async fn milestones(&self, _project_id: u64) -> Result<Vec<SourceMilestone>, GitLabError> {
        Ok(self.milestones.clone())
    }

    async fn labels(&self, _project_id: u64) -> Result<Vec<SourceLabel>, GitLabError> {
        Ok(self.labels.clone())
    }

    async fn issues(&self, _project_id: u64) -> Result<Vec<SourceIssue>, GitLabError> {
        Ok(self.issues.clone())
    }

    async fn issue_notes(
        &self,
        _project_id: u64,
        issue_iid: u64,
    ) -> Result<Vec<SourceNote>, GitLabError> {
        self.notes_requested.lock().unwrap().push(issue_iid);
        Ok(self.issue_notes.get(&issue_iid).cloned().unwrap_or_default())
    }

    async fn merge_requests(
        &self,
        _project_id: u64,
    ) -> Result<Vec<SourceMergeRequest>, GitLabError> {
        Ok(self.merge_requests.clone())
    }

    async fn merge_request(
        &self,
        _project_id: u64,
        merge_request_iid: u64,
    ) -> Result<SourceMergeRequest, GitLabError> {
        self.merge_requests
            .iter()
            .find(|merge_request| merge_request.iid == merge_request_iid)
            .cloned()
            .ok_or_else(|| GitLabError::NotFound(format!("merge_requests/{merge_request_iid}")))
    }

    async fn merge_request_notes(
        &self,
        _project_id: u64,
        merge_request_iid: u64,
    ) -> Result<Vec<SourceNote>, GitLabError> {
        Ok(self
            .merge_request_notes
            .get(&merge_request_iid)
            .cloned()
            .unwrap_or_default())
    }

    async fn commit(&self, _project_id: u64, sha: &str) -> Result<SourceCommit, GitLabError> {
        self.commits
            .get(sha)
            .cloned()
            .ok_or_else(|| GitLabError::NotFound(format!("commits/{sha}")))
    }
}

/// An issue or pull request stored by [`FakeDestination`].
#[derive(Debug, Clone)]
pub struct StoredIssue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: DestinationState,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
    pub comments: Vec<String>,
    pub pull: Option<NewPullRequest>,
}

/// Everything the fake repository holds.
#[derive(Default)]
pub struct Repository {
    pub milestones: Vec<(DestinationMilestone, NewMilestone)>,
    pub labels: Vec<NewLabel>,
    pub issues: Vec<StoredIssue>,
    pub branches: Vec<(String, String)>,
    pub pages_requested: Vec<u32>,
}

/// Destination repository that numbers issues and pull requests like GitHub.
#[derive(Default)]
pub struct FakeDestination {
    pub state: Mutex<Repository>,
    pub fail_issue_listing: bool,
    /// Issue titles whose creation is rejected.
    pub reject_titles: Vec<String>,
}

impl FakeDestination {
    pub fn issues(&self) -> Vec<StoredIssue> {
        self.state.lock().unwrap().issues.clone()
    }

    pub fn labels(&self) -> Vec<NewLabel> {
        self.state.lock().unwrap().labels.clone()
    }

    pub fn milestones(&self) -> Vec<NewMilestone> {
        self.state
            .lock()
            .unwrap()
            .milestones
            .iter()
            .map(|(_, created)| created.clone())
            .collect()
    }

    pub fn branches(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().branches.clone()
    }

    pub fn issue(&self, title: &str) -> StoredIssue {
        self.issues()
            .into_iter()
            .find(|issue| issue.title == title)
            .unwrap_or_else(|| panic!("no destination item titled {title:?}"))
    }

    /// Adds an item as if created by an earlier run or by hand.
    pub fn seed_issue(&self, title: &str, state: DestinationState) -> u64 {
        let mut destination = self.state.lock().unwrap();
        let number = destination.issues.len() as u64 + 1;
        destination.issues.push(StoredIssue {
            number,
            title: title.to_string(),
            body: String::new(),
            state,
            labels: Vec::new(),
            assignees: Vec::new(),
            milestone: None,
            comments: Vec::new(),
            pull: None,
        });
        number
    }

    fn push(&self, title: &str, body: &str, pull: Option<NewPullRequest>) -> DestinationIssue {
        let mut destination = self.state.lock().unwrap();
        let number = destination.issues.len() as u64 + 1;
        let is_pull_request = pull.is_some();
        destination.issues.push(StoredIssue {
            number,
            title: title.to_string(),
            body: body.to_string(),
            state: DestinationState::Open,
            labels: Vec::new(),
            assignees: Vec::new(),
            milestone: None,
            comments: Vec::new(),
            pull,
        });
        DestinationIssue {
            number,
            title: title.to_string(),
            state: DestinationState::Open,
            is_pull_request,
        }
    }

    fn rejected(message: &str) -> GitHubError {
        GitHubError::Rejected {
            status: 422,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl DestinationApi for FakeDestination {
    async fn milestones(&self) -> Result<Vec<DestinationMilestone>, GitHubError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .milestones
            .iter()
            .map(|(milestone, _)| milestone.clone())
            .collect())
    }

    async fn create_milestone(
        &self,
        milestone: &NewMilestone,
    ) -> Result<DestinationMilestone, GitHubError> {
        let mut destination = self.state.lock().unwrap();
        let created = DestinationMilestone {
            number: destination.milestones.len() as u64 + 1,
            title: milestone.title.clone(),
        };
        destination
            .milestones
            .push((created.clone(), milestone.clone()));
        Ok(created)
    }

    async fn label_names(&self) -> Result<Vec<String>, GitHubError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .labels
            .iter()
            .map(|label| label.name.clone())
            .collect())
    }

    async fn create_label(&self, label: &NewLabel) -> Result<(), GitHubError> {
        let mut destination = self.state.lock().unwrap();
        if destination
            .labels
            .iter()
            .any(|existing| existing.name.eq_ignore_ascii_case(&label.name))
        {
            return Err(GitHubError::AlreadyExists(label.name.clone()));
        }
        destination.labels.push(label.clone());
        Ok(())
    }

    async fn issues_page(
        &self,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<DestinationIssue>, GitHubError> {
        if self.fail_issue_listing {
            return Err(Self::rejected("listing disabled"));
        }

        let mut destination = self.state.lock().unwrap();
        destination.pages_requested.push(page);
        let size = usize::from(per_page);
        let start = (page as usize - 1) * size;
        Ok(destination
            .issues
            .iter()
            .skip(start)
            .take(size)
            .map(|issue| DestinationIssue {
                number: issue.number,
                title: issue.title.clone(),
                state: issue.state,
                is_pull_request: issue.pull.is_some(),
            })
            .collect())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<DestinationIssue, GitHubError> {
        if self.reject_titles.contains(&issue.title) {
            return Err(Self::rejected("Validation Failed"));
        }

        let created = self.push(&issue.title, &issue.body, None);
        let mut destination = self.state.lock().unwrap();
        if let Some(stored) = destination.issues.last_mut() {
            stored.labels = issue.labels.clone();
            stored.assignees = issue.assignees.clone();
            stored.milestone = issue.milestone;
        }
        Ok(created)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), GitHubError> {
        let mut destination = self.state.lock().unwrap();
        let stored = destination
            .issues
            .iter_mut()
            .find(|issue| issue.number == number)
            .ok_or_else(|| Self::rejected("Not Found"))?;
        stored.comments.push(body.to_string());
        Ok(())
    }

    async fn close_issue(&self, number: u64) -> Result<(), GitHubError> {
        let mut destination = self.state.lock().unwrap();
        let stored = destination
            .issues
            .iter_mut()
            .find(|issue| issue.number == number)
            .ok_or_else(|| Self::rejected("Not Found"))?;
        stored.state = DestinationState::Closed;
        Ok(())
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<(), GitHubError> {
        let mut destination = self.state.lock().unwrap();
        if destination.branches.iter().any(|(branch, _)| branch == name) {
            return Err(GitHubError::AlreadyExists(
                "Reference already exists".to_string(),
            ));
        }
        destination
            .branches
            .push((name.to_string(), sha.to_string()));
        Ok(())
    }

    async fn create_pull_request(
        &self,
        pull: &NewPullRequest,
    ) -> Result<DestinationIssue, GitHubError> {
        Ok(self.push(&pull.title, &pull.body, Some(pull.clone())))
    }
}
