//! GitHub REST client built on octocrab.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error::{classify, GitHubError};
use super::types::{
    DestinationIssue, DestinationMilestone, DestinationState, NewIssue, NewLabel, NewMilestone,
    NewPullRequest,
};
use super::DestinationApi;
use crate::config::GitHubSettings;
use crate::rate_limit::{check_core_rate_limit, ensure_core_rate_limit, RateLimitInfo};

/// Items requested per page for milestone and label listings.
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct IssueResponse {
    number: u64,
    title: String,
    state: DestinationState,
    /// Present only on pull requests.
    pull_request: Option<serde_json::Value>,
}

impl From<IssueResponse> for DestinationIssue {
    fn from(response: IssueResponse) -> Self {
        Self {
            number: response.number,
            title: response.title,
            state: response.state,
            is_pull_request: response.pull_request.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    state: DestinationState,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    name: String,
}

/// Authenticated client scoped to one destination repository.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Builds a client from the destination settings.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Api`] if the base URL is invalid or the client
    /// cannot be constructed.
    pub fn new(settings: &GitHubSettings) -> Result<Self, GitHubError> {
        let builder = Octocrab::builder().personal_token(settings.token.clone());
        let builder = match &settings.base_url {
            Some(base_url) => builder.base_uri(base_url.as_str())?,
            None => builder,
        };

        Ok(Self {
            octocrab: builder.build()?,
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
        })
    }

    /// Reads the current core request quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate limit endpoint cannot be read.
    pub async fn quota(&self) -> Result<RateLimitInfo, GitHubError> {
        check_core_rate_limit(&self.octocrab).await.map_err(classify)
    }

    fn route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{suffix}", self.owner, self.repo)
    }

    async fn get_all_pages<T: DeserializeOwned>(&self, suffix: &str) -> Result<Vec<T>, GitHubError> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let route = self.route(&format!(
                "{suffix}?state=all&per_page={PER_PAGE}&page={page}"
            ));
            debug!(route = %route, "GET");
            let items: Vec<T> = self
                .octocrab
                .get(&route, None::<&()>)
                .await
                .map_err(classify)?;

            let count = items.len();
            all_items.extend(items);

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all_items)
    }
}

#[async_trait]
impl DestinationApi for GitHubClient {
    async fn milestones(&self) -> Result<Vec<DestinationMilestone>, GitHubError> {
        self.get_all_pages("/milestones").await
    }

    async fn create_milestone(
        &self,
        milestone: &NewMilestone,
    ) -> Result<DestinationMilestone, GitHubError> {
        self.octocrab
            .post(self.route("/milestones"), Some(milestone))
            .await
            .map_err(classify)
    }

    async fn label_names(&self) -> Result<Vec<String>, GitHubError> {
        let labels: Vec<LabelResponse> = self.get_all_pages("/labels").await?;
        Ok(labels.into_iter().map(|label| label.name).collect())
    }

    async fn create_label(&self, label: &NewLabel) -> Result<(), GitHubError> {
        let _: LabelResponse = self
            .octocrab
            .post(self.route("/labels"), Some(label))
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn issues_page(
        &self,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<DestinationIssue>, GitHubError> {
        let route = self.route(&format!(
            "/issues?state=all&sort=created&direction=asc&per_page={per_page}&page={page}"
        ));
        debug!(route = %route, "GET");
        let issues: Vec<IssueResponse> = self
            .octocrab
            .get(&route, None::<&()>)
            .await
            .map_err(classify)?;
        Ok(issues.into_iter().map(DestinationIssue::from).collect())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<DestinationIssue, GitHubError> {
        let created: IssueResponse = self
            .octocrab
            .post(self.route("/issues"), Some(issue))
            .await
            .map_err(classify)?;
        Ok(created.into())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), GitHubError> {
        let _: serde_json::Value = self
            .octocrab
            .post(
                self.route(&format!("/issues/{number}/comments")),
                Some(&json!({ "body": body })),
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn close_issue(&self, number: u64) -> Result<(), GitHubError> {
        let _: serde_json::Value = self
            .octocrab
            .patch(
                self.route(&format!("/issues/{number}")),
                Some(&json!({ "state": "closed" })),
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<(), GitHubError> {
        let _: serde_json::Value = self
            .octocrab
            .post(
                self.route("/git/refs"),
                Some(&json!({ "ref": format!("refs/heads/{name}"), "sha": sha })),
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        pull: &NewPullRequest,
    ) -> Result<DestinationIssue, GitHubError> {
        let created: PullResponse = self
            .octocrab
            .post(self.route("/pulls"), Some(pull))
            .await
            .map_err(classify)?;
        Ok(DestinationIssue {
            number: created.number,
            title: created.title,
            state: created.state,
            is_pull_request: true,
        })
    }

    async fn wait_for_quota(&self) -> Result<(), GitHubError> {
        ensure_core_rate_limit(&self.octocrab)
            .await
            .map_err(classify)
    }
}
