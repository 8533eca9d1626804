//! Milestone migration.

use super::{MigrateError, Migrator};
use crate::destination::{DestinationState, NewMilestone};
use crate::reconcile::TitleIndex;
use crate::source::SourceMilestone;
use crate::summary::{ItemOutcome, PhaseSummary};
use tracing::{debug, error, info, info_span, Instrument};

/// Source state that maps to an open destination milestone.
const ACTIVE_STATE: &str = "active";

impl Migrator<'_> {
    /// Creates every source milestone missing on the destination.
    ///
    /// Existing milestones are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError`] if either milestone list cannot be read.
    pub async fn migrate_milestones(&self) -> Result<PhaseSummary, MigrateError> {
        let span = info_span!("milestones", project_id = self.project_id);

        async {
            let mut milestones = self
                .source
                .milestones(self.project_id)
                .await
                .map_err(MigrateError::gitlab("milestones"))?;
            milestones.sort_by_key(|milestone| milestone.id);

            let existing = self
                .destination
                .milestones()
                .await
                .map_err(MigrateError::github("milestones"))?;
            let mut index = TitleIndex::new(
                existing
                    .into_iter()
                    .map(|milestone| (milestone.title, milestone.number)),
            );
            debug!(existing = index.len(), "Fetched destination snapshot");

            let mut summary = PhaseSummary::default();
            for milestone in &milestones {
                if index.contains(&milestone.title) {
                    info!(title = %milestone.title, "Already exists");
                    summary.record(ItemOutcome::Existing);
                    continue;
                }

                info!(title = %milestone.title, "Creating");
                match self
                    .destination
                    .create_milestone(&new_milestone(milestone))
                    .await
                {
                    Ok(created) => {
                        index.insert(&created.title, created.number);
                        summary.record(ItemOutcome::Created);
                    }
                    Err(e) => {
                        error!(title = %milestone.title, error = %e, "Failed to create milestone");
                        summary.record(ItemOutcome::Failed);
                    }
                }
            }

            info!(
                created = summary.created,
                existing = summary.existing,
                failed = summary.failed,
                "Milestones done"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}

/// Builds the destination payload for a source milestone.
#[must_use]
pub fn new_milestone(milestone: &SourceMilestone) -> NewMilestone {
    let state = if milestone.state == ACTIVE_STATE {
        DestinationState::Open
    } else {
        DestinationState::Closed
    };

    NewMilestone {
        title: milestone.title.clone(),
        description: milestone
            .description
            .clone()
            .filter(|description| !description.is_empty()),
        state,
        due_on: milestone
            .due_date
            .map(|date| format!("{}T00:00:00Z", date.format("%Y-%m-%d"))),
    }
}
