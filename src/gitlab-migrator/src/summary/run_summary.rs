//! Run summary types.

use super::phase::{Phase, PhaseSummary};
use crate::rate_limit::RateLimitInfo;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Phases that ran, in order.
    pub phases: Vec<(Phase, PhaseSummary)>,

    /// Destination request quota before the first phase.
    pub quota_before: Option<RateLimitInfo>,

    /// Destination request quota after the last phase.
    pub quota_after: Option<RateLimitInfo>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Appends the result of a finished phase.
    pub fn record_phase(&mut self, phase: Phase, summary: PhaseSummary) {
        self.phases.push((phase, summary));
    }

    /// Total items that failed across phases.
    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.phases.iter().map(|(_, summary)| summary.failed).sum()
    }

    /// Requests consumed during the run, when both readings share a window.
    #[must_use]
    pub fn quota_consumed(&self) -> Option<u32> {
        match (&self.quota_before, &self.quota_after) {
            (Some(before), Some(after)) => after.consumed_since(before),
            _ => None,
        }
    }
}
