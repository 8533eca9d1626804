//! Orchestrates a migration run.

mod error;

pub use error::RunnerError;

use crate::config::{Settings, TransferSettings};
use crate::destination::{DestinationApi, DryRunDestination, GitHubClient};
use crate::migrate::Migrator;
use crate::rate_limit::RateLimitInfo;
use crate::source::{GitLabClient, SourceApi, SourceProject};
use crate::summary::{Phase, RunSummary};
use tracing::{info, info_span, warn, Instrument};

/// What a run produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// No project was configured; these are the projects the token can see.
    Projects(Vec<SourceProject>),
    /// The configured project was migrated.
    Migrated(RunSummary),
}

/// Runs every enabled phase for the configured project.
pub struct Runner<'a> {
    settings: &'a Settings,
    gitlab: GitLabClient,
    github: GitHubClient,
    dry_run: bool,
}

impl<'a> Runner<'a> {
    /// Builds both API clients from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if a client cannot be constructed.
    pub fn new(settings: &'a Settings) -> Result<Self, RunnerError> {
        let gitlab = GitLabClient::new(&settings.gitlab.url, &settings.gitlab.token)?;
        let github = GitHubClient::new(&settings.github)?;
        Ok(Self {
            settings,
            gitlab,
            github,
            dry_run: false,
        })
    }

    /// Logs destination writes instead of sending them.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Lists source projects when no project is configured, migrates it otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if listing projects fails or a phase cannot
    /// read a collection it depends on. Failures on single items do not
    /// stop the run.
    pub async fn run(&self) -> Result<RunOutcome, RunnerError> {
        match self.settings.gitlab.project_id {
            None => {
                info!(url = %self.gitlab.api_url(), "No project id configured, listing projects");
                Ok(RunOutcome::Projects(self.gitlab.projects().await?))
            }
            Some(project_id) => Ok(RunOutcome::Migrated(self.migrate(project_id).await?)),
        }
    }

    async fn migrate(&self, project_id: u64) -> Result<RunSummary, RunnerError> {
        let span = info_span!(
            "migrate",
            project_id,
            repo = %self.settings.github.full_name(),
            dry_run = self.dry_run
        );

        async {
            let mut summary = RunSummary::new(self.dry_run);
            summary.quota_before = self.quota("before").await;

            let dry_run_destination;
            let destination: &dyn DestinationApi = if self.dry_run {
                dry_run_destination = DryRunDestination::new(&self.github);
                &dry_run_destination
            } else {
                &self.github
            };
            let migrator = Migrator::new(&self.gitlab, destination, self.settings, project_id)?;

            for phase in Phase::ORDER {
                if !phase_enabled(&self.settings.transfer, phase) {
                    info!(%phase, "Phase disabled, skipping");
                    continue;
                }

                info!(%phase, "Starting phase");
                let result = match phase {
                    Phase::Milestones => migrator.migrate_milestones().await,
                    Phase::Labels => migrator.migrate_labels().await,
                    Phase::Issues => migrator.migrate_issues().await,
                    Phase::MergeRequests => migrator.migrate_merge_requests().await,
                };
                let phase_summary = result.map_err(|source| RunnerError::Phase { phase, source })?;
                summary.record_phase(phase, phase_summary);
            }

            summary.quota_after = self.quota("after").await;
            if let Some(consumed) = summary.quota_consumed() {
                info!(consumed, "Requests consumed");
            }
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Reads the destination quota, logging rather than failing on errors.
    async fn quota(&self, when: &str) -> Option<RateLimitInfo> {
        match self.github.quota().await {
            Ok(quota) => {
                info!(when, %quota, "GitHub request quota");
                Some(quota)
            }
            Err(e) => {
                warn!(when, error = %e, "Failed to read GitHub request quota");
                None
            }
        }
    }
}

/// Returns true if the settings enable `phase`.
#[must_use]
pub fn phase_enabled(transfer: &TransferSettings, phase: Phase) -> bool {
    match phase {
        Phase::Milestones => transfer.milestones,
        Phase::Labels => transfer.labels,
        Phase::Issues => transfer.issues,
        Phase::MergeRequests => transfer.merge_requests,
    }
}
