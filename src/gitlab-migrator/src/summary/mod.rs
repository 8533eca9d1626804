//! Run summary types and helpers.

mod phase;
mod run_summary;

pub use phase::{ItemOutcome, Phase, PhaseSummary};
pub use run_summary::RunSummary;
