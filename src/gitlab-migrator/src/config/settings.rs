//! Settings file deserialization.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Mapping from source username to destination username.
pub type UserMap = BTreeMap<String, String>;

/// Mapping from a source `group/project` reference key to the destination `Org/Project`.
pub type ProjectMap = BTreeMap<String, String>;

/// Parsed contents of the settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Source service connection.
    pub gitlab: GitLabSettings,

    /// Destination service connection.
    pub github: GitHubSettings,

    /// Conversion options.
    #[serde(default)]
    pub conversion: ConversionSettings,

    /// Which phases to run.
    #[serde(default)]
    pub transfer: TransferSettings,

    /// Source username -> destination username.
    #[serde(default)]
    pub usermap: UserMap,

    /// Source project key -> destination repository.
    #[serde(default)]
    pub projectmap: ProjectMap,
}

/// Source (GitLab) connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabSettings {
    /// Instance URL, e.g. `https://gitlab.com`.
    pub url: String,

    /// Personal access token.
    #[serde(default)]
    pub token: String,

    /// Numeric project id. When absent, accessible projects are listed instead.
    pub project_id: Option<u64>,
}

/// Destination (GitHub) connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubSettings {
    /// API root override for GitHub Enterprise.
    pub base_url: Option<String>,

    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Username the token authenticates as.
    pub username: String,

    /// Personal access token.
    #[serde(default)]
    pub token: String,
}

impl GitHubSettings {
    /// Returns the repository in `owner/repo` form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Options affecting how source data is converted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConversionSettings {
    /// Lower-case every label name before comparison and creation.
    #[serde(default)]
    pub use_lower_case_labels: bool,
}

/// Per-phase switches. Enabled phases always run in the fixed order
/// milestones, labels, issues, merge requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransferSettings {
    #[serde(default = "enabled")]
    pub milestones: bool,

    #[serde(default = "enabled")]
    pub labels: bool,

    #[serde(default = "enabled")]
    pub issues: bool,

    #[serde(default = "enabled")]
    pub merge_requests: bool,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            milestones: true,
            labels: true,
            issues: true,
            merge_requests: true,
        }
    }
}

fn enabled() -> bool {
    true
}
