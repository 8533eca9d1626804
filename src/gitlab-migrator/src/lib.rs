#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod destination;
pub mod migrate;
pub mod rate_limit;
pub mod reconcile;
pub mod runner;
pub mod source;
pub mod summary;
pub mod transform;

pub use config::{ConfigError, Settings, TokenOverrides};
pub use destination::{list_all_issues, DestinationApi, DryRunDestination, GitHubClient, GitHubError};
pub use migrate::{MigrateError, Migrator};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, RateLimitInfo};
pub use reconcile::{title_key, TitleIndex};
pub use runner::{RunOutcome, Runner, RunnerError};
pub use source::{GitLabClient, GitLabError, SourceApi};
pub use summary::{ItemOutcome, Phase, PhaseSummary, RunSummary};
pub use transform::{has_attachment, NoteFilter, SyntheticNoteCategory, TextTransformer};
