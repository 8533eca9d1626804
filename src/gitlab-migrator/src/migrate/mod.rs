//! Entity migrators.
//!
//! Each phase fetches the source collection, snapshots the destination
//! collection into a [`TitleIndex`](crate::reconcile::TitleIndex), creates
//! whatever is missing, and fixes up open/closed state. All requests are
//! awaited one after another so destination numbers follow creation order.

mod error;
mod issues;
mod labels;
mod merge_requests;
mod milestones;

pub use error::MigrateError;
pub use issues::{fill_gaps, placeholder_issue, PLACEHOLDER_BODY, PLACEHOLDER_TITLE_PREFIX};
pub use labels::{normalize_color, ATTACHMENT_LABEL, ATTACHMENT_LABEL_COLOR};
pub use merge_requests::{branch_names, is_eligible, resolve_base_parent};
pub use milestones::new_milestone;

use crate::config::Settings;
use crate::destination::DestinationApi;
use crate::source::{SourceApi, SourceNote, SourceUser};
use crate::transform::{NoteFilter, TextTransformer};
use tracing::{debug, error};

/// Name used for the source service in attribution lines.
pub const SOURCE_NAME: &str = "GitLab";

/// Migrates one source project into the configured destination repository.
pub struct Migrator<'a> {
    source: &'a dyn SourceApi,
    destination: &'a dyn DestinationApi,
    settings: &'a Settings,
    project_id: u64,
    transformer: TextTransformer,
    notes: NoteFilter,
}

impl<'a> Migrator<'a> {
    /// Creates a migrator for `project_id`, compiling the reference and note patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new(
        source: &'a dyn SourceApi,
        destination: &'a dyn DestinationApi,
        settings: &'a Settings,
        project_id: u64,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            source,
            destination,
            settings,
            project_id,
            transformer: TextTransformer::new(
                SOURCE_NAME,
                &settings.usermap,
                &settings.projectmap,
            )?,
            notes: NoteFilter::new()?,
        })
    }

    fn label_name(&self, name: &str) -> String {
        label_name(name, self.settings.conversion.use_lower_case_labels)
    }

    /// Posts the transferable `notes` on destination item `number`, oldest first.
    ///
    /// Returns how many comments were created. Failures are logged per comment.
    async fn transfer_notes(&self, number: u64, notes: Vec<SourceNote>) -> usize {
        let total = notes.len();
        let notes = self.notes.transferable(notes);
        debug!(
            number,
            kept = notes.len(),
            dropped = total - notes.len(),
            "Filtered notes"
        );

        let mut transferred = 0;
        for note in &notes {
            let body = self.transformer.transform(&note.body, note);
            match self.destination.create_comment(number, &body).await {
                Ok(()) => transferred += 1,
                Err(e) => error!(number, note_id = note.id, error = %e, "Failed to create comment"),
            }
        }
        transferred
    }
}

/// Applies the lower-case option to a label name.
#[must_use]
pub fn label_name(name: &str, lower_case: bool) -> String {
    if lower_case {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

/// Maps a source assignee to a destination login.
///
/// The migration user maps to itself; anyone else needs a user map entry.
#[must_use]
pub fn map_assignee(user: Option<&SourceUser>, settings: &Settings) -> Option<String> {
    let username = &user?.username;
    if *username == settings.github.username {
        return Some(username.clone());
    }
    settings.usermap.get(username).cloned()
}
