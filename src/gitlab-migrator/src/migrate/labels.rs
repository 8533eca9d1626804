//! Label migration.

use super::{MigrateError, Migrator};
use crate::destination::NewLabel;
use crate::reconcile::TitleIndex;
use crate::source::SourceLabel;
use crate::summary::{ItemOutcome, PhaseSummary};
use tracing::{debug, error, info, info_span, Instrument};

/// Label added to issues whose body links an uploaded file.
pub const ATTACHMENT_LABEL: &str = "has attachment";

/// Color of [`ATTACHMENT_LABEL`].
pub const ATTACHMENT_LABEL_COLOR: &str = "#fbca04";

impl Migrator<'_> {
    /// Creates every source label, plus [`ATTACHMENT_LABEL`], missing on the destination.
    ///
    /// Creation failures are logged and counted. A conflict with an existing
    /// label is expected when lower-casing folds two names together.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError`] if either label list cannot be read.
    pub async fn migrate_labels(&self) -> Result<PhaseSummary, MigrateError> {
        let span = info_span!("labels", project_id = self.project_id);

        async {
            let mut labels = self
                .source
                .labels(self.project_id)
                .await
                .map_err(MigrateError::gitlab("labels"))?;
            labels.push(attachment_label());

            let existing = self
                .destination
                .label_names()
                .await
                .map_err(MigrateError::github("labels"))?;
            let mut index =
                TitleIndex::from_titles(existing.iter().map(|name| self.label_name(name)));
            debug!(existing = index.len(), "Fetched destination snapshot");

            let mut summary = PhaseSummary::default();
            for label in &labels {
                let name = self.label_name(&label.name);
                if index.contains(&name) {
                    info!(name = %name, "Already exists");
                    summary.record(ItemOutcome::Existing);
                    continue;
                }

                info!(name = %name, "Creating");
                let new_label = NewLabel {
                    name: name.clone(),
                    color: normalize_color(&label.color),
                    description: label
                        .description
                        .clone()
                        .filter(|description| !description.is_empty()),
                };
                match self.destination.create_label(&new_label).await {
                    Ok(()) => {
                        index.insert(&name, ());
                        summary.record(ItemOutcome::Created);
                    }
                    Err(e) if e.is_already_exists() => {
                        info!(name = %name, "Already exists");
                        index.insert(&name, ());
                        summary.record(ItemOutcome::Existing);
                    }
                    Err(e) => {
                        error!(name = %name, error = %e, "Failed to create label");
                        summary.record(ItemOutcome::Failed);
                    }
                }
            }

            info!(
                created = summary.created,
                existing = summary.existing,
                failed = summary.failed,
                "Labels done"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}

fn attachment_label() -> SourceLabel {
    SourceLabel {
        name: ATTACHMENT_LABEL.to_string(),
        color: ATTACHMENT_LABEL_COLOR.to_string(),
        description: None,
    }
}

/// Strips the leading `#` the destination API rejects.
#[must_use]
pub fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_string()
}
