//! GitLab REST client.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::GitLabError;
use super::types::{
    SourceCommit, SourceIssue, SourceLabel, SourceMergeRequest, SourceMilestone, SourceNote,
    SourceProject,
};
use super::SourceApi;

/// Items requested per page.
const PER_PAGE: usize = 100;

/// Request timeout.
const TIMEOUT_SECS: u64 = 30;

/// HTTP client for the GitLab v4 API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct GitLabClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GitLabClient {
    /// Creates a client for the instance at `url`, e.g. `https://gitlab.com`.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::Http`] if the HTTP client cannot be built.
    pub fn new(url: &str, token: &str) -> Result<Self, GitLabError> {
        let http = Client::builder()
            .user_agent("gitlab-migrator")
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_url: format!("{}/api/v4", url.trim_end_matches('/')),
            token: token.to_string(),
        })
    }

    /// Returns the API root, e.g. `https://gitlab.com/api/v4`.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitLabError> {
        debug!(path, "GET");
        let response = self
            .http
            .get(format!("{}{path}", self.api_url))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitLabError::from_status(status, path, body));
        }

        response
            .json()
            .await
            .map_err(|e| GitLabError::InvalidResponse {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    /// Fetches every page of a list endpoint, stopping at the first short or empty page.
    async fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GitLabError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let items: Vec<T> = self
                .get(&format!("{path}{separator}per_page={PER_PAGE}&page={page}"))
                .await?;

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
impl SourceApi for GitLabClient {
    async fn projects(&self) -> Result<Vec<SourceProject>, GitLabError> {
        self.get_paginated("/projects?membership=true&order_by=id&sort=asc")
            .await
    }

    async fn milestones(&self, project_id: u64) -> Result<Vec<SourceMilestone>, GitLabError> {
        self.get_paginated(&format!("/projects/{project_id}/milestones"))
            .await
    }

    async fn labels(&self, project_id: u64) -> Result<Vec<SourceLabel>, GitLabError> {
        self.get_paginated(&format!("/projects/{project_id}/labels"))
            .await
    }

    async fn issues(&self, project_id: u64) -> Result<Vec<SourceIssue>, GitLabError> {
        self.get_paginated(&format!(
            "/projects/{project_id}/issues?order_by=created_at&sort=asc"
        ))
        .await
    }

    async fn issue_notes(
        &self,
        project_id: u64,
        issue_iid: u64,
    ) -> Result<Vec<SourceNote>, GitLabError> {
        self.get_paginated(&format!(
            "/projects/{project_id}/issues/{issue_iid}/notes?sort=asc"
        ))
        .await
    }

    async fn merge_requests(&self, project_id: u64) -> Result<Vec<SourceMergeRequest>, GitLabError> {
        self.get_paginated(&format!(
            "/projects/{project_id}/merge_requests?state=all&sort=asc"
        ))
        .await
    }

    async fn merge_request(
        &self,
        project_id: u64,
        merge_request_iid: u64,
    ) -> Result<SourceMergeRequest, GitLabError> {
        self.get(&format!(
            "/projects/{project_id}/merge_requests/{merge_request_iid}"
        ))
        .await
    }

    async fn merge_request_notes(
        &self,
        project_id: u64,
        merge_request_iid: u64,
    ) -> Result<Vec<SourceNote>, GitLabError> {
        self.get_paginated(&format!(
            "/projects/{project_id}/merge_requests/{merge_request_iid}/notes?sort=asc"
        ))
        .await
    }

    async fn commit(&self, project_id: u64, sha: &str) -> Result<SourceCommit, GitLabError> {
        self.get(&format!("/projects/{project_id}/repository/commits/{sha}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn label(i: usize) -> serde_json::Value {
        json!({ "name": format!("label-{i}"), "color": "#fbca04", "description": null })
    }

    #[tokio::test]
    async fn sends_private_token_and_stops_on_short_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/7/labels"))
            .and(header("PRIVATE-TOKEN", "secret"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([label(1), label(2)])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GitLabClient::new(&mock_server.uri(), "secret").unwrap();
        let labels = client.labels(7).await.unwrap();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name, "label-1");
    }

    #[tokio::test]
    async fn walks_every_full_page() {
        let mock_server = MockServer::start().await;
        let full_page: Vec<_> = (0..PER_PAGE).map(label).collect();

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/7/labels"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/7/labels"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = GitLabClient::new(&mock_server.uri(), "secret").unwrap();
        let labels = client.labels(7).await.unwrap();

        assert_eq!(labels.len(), PER_PAGE);
    }

    #[tokio::test]
    async fn maps_missing_project_to_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/404/milestones"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = GitLabClient::new(&mock_server.uri(), "secret").unwrap();
        let result = client.milestones(404).await;

        assert!(matches!(result, Err(GitLabError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetches_commit_parents() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/7/repository/commits/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc",
                "parent_ids": ["p1", "p2"]
            })))
            .mount(&mock_server)
            .await;

        let client = GitLabClient::new(&format!("{}/", mock_server.uri()), "secret").unwrap();
        let commit = client.commit(7, "abc").await.unwrap();

        assert_eq!(commit.parent_ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn fetches_merge_request_diff_refs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/7/merge_requests/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 30,
                "iid": 3,
                "title": "Add parser",
                "description": null,
                "state": "opened",
                "source_branch": "feature",
                "target_branch": "main",
                "sha": "head3",
                "merge_commit_sha": null,
                "diff_refs": {
                    "base_sha": "base3",
                    "head_sha": "head3",
                    "start_sha": "base3"
                },
                "author": { "id": 1, "username": "jdoe", "name": "J Doe" },
                "created_at": "2019-02-01T08:00:00.000Z"
            })))
            .mount(&mock_server)
            .await;

        let client = GitLabClient::new(&mock_server.uri(), "secret").unwrap();
        let merge_request = client.merge_request(7, 3).await.unwrap();

        assert_eq!(
            merge_request.diff_refs.and_then(|refs| refs.base_sha).as_deref(),
            Some("base3")
        );
    }
}
