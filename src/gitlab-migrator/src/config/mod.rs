//! Settings loading.
//!
//! This module parses the settings file, applies token overrides coming from
//! the command line or environment, and validates the result before any
//! network call is made.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    ConversionSettings, GitHubSettings, GitLabSettings, ProjectMap, Settings, TransferSettings,
    UserMap,
};

use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Token values that take precedence over the ones in the settings file.
#[derive(Debug, Clone, Default)]
pub struct TokenOverrides {
    /// Replaces `gitlab.token` when set.
    pub gitlab: Option<String>,
    /// Replaces `github.token` when set.
    pub github: Option<String>,
}

impl Settings {
    /// Loads, overrides and validates a settings file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML settings file
    /// * `overrides` - Tokens supplied outside the file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, malformed,
    /// or fails validation.
    pub fn load(path: &Path, overrides: TokenOverrides) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading settings");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut settings: Settings =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError {
                path: path.display().to_string(),
                source: e,
            })?;

        settings.apply_overrides(overrides);
        settings.validate(path)?;

        debug!(
            usermap = settings.usermap.len(),
            projectmap = settings.projectmap.len(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Replaces tokens with the given overrides.
    pub fn apply_overrides(&mut self, overrides: TokenOverrides) {
        if let Some(token) = overrides.gitlab {
            self.gitlab.token = token;
        }
        if let Some(token) = overrides.github {
            self.github.token = token;
        }
    }

    /// Validates required values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first offending key.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        if Url::parse(&self.gitlab.url).is_err() {
            return Err(invalid(format!(
                "gitlab.url is not a valid URL: {}",
                self.gitlab.url
            )));
        }

        if let Some(base_url) = &self.github.base_url {
            if Url::parse(base_url).is_err() {
                return Err(invalid(format!(
                    "github.base-url is not a valid URL: {base_url}"
                )));
            }
        }

        let required = [
            ("gitlab.token", &self.gitlab.token),
            ("github.token", &self.github.token),
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
            ("github.username", &self.github.username),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(invalid(format!("{key} must not be empty")));
            }
        }

        Ok(())
    }
}
