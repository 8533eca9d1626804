//! Per-phase outcome counting.

use std::fmt;

/// A migration phase. Phases always run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Milestones,
    Labels,
    Issues,
    MergeRequests,
}

impl Phase {
    /// All phases in execution order.
    pub const ORDER: [Phase; 4] = [
        Phase::Milestones,
        Phase::Labels,
        Phase::Issues,
        Phase::MergeRequests,
    ];

    /// Returns the phase name for logs and the summary.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Milestones => "milestones",
            Self::Labels => "labels",
            Self::Issues => "issues",
            Self::MergeRequests => "merge requests",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a single source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Created on the destination.
    Created,
    /// A destination item with the same title was found.
    Existing,
    /// Not eligible for migration.
    Skipped,
    /// Creation failed; the run continued.
    Failed,
}

/// Counters for one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSummary {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Comments transferred onto created issues or pull requests.
    pub comments: usize,
}

impl PhaseSummary {
    /// Counts one item outcome.
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Created => self.created += 1,
            ItemOutcome::Existing => self.existing += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }

    /// Number of items seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.existing + self.skipped + self.failed
    }
}
