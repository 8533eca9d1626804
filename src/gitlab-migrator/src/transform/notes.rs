//! Classification of system-generated notes.
//!
//! GitLab narrates state changes (status, milestone, labels, assignees,
//! cross references) as notes. The destination tracks that state itself, so
//! these notes are dropped instead of transferred.

use regex::Regex;

use crate::source::SourceNote;

/// Kinds of narration notes that are never transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticNoteCategory {
    /// "Status changed to closed", "reopened", ...
    StatusChange,
    /// "changed milestone to %v1.0", "removed milestone"
    MilestoneChange,
    /// "added ~bug label", "removed ~wontfix label"
    LabelChange,
    /// "Reassigned to @jdoe", "assigned to @jdoe"
    Reassignment,
    /// "mentioned in issue #12", "mentioned in commit abc123"
    CrossReference,
}

/// One row of the classification table: a note matching `pattern` belongs to
/// `category` unless it also matches `exception`.
struct Rule {
    category: SyntheticNoteCategory,
    pattern: &'static str,
    exception: Option<&'static str>,
}

const RULES: &[Rule] = &[
    Rule {
        category: SyntheticNoteCategory::StatusChange,
        pattern: r"(?i)^\s*status changed to ",
        exception: Some(r"(?i)^\s*status changed to closed by commit "),
    },
    Rule {
        category: SyntheticNoteCategory::StatusChange,
        pattern: r"(?i)^\s*(closed|reopened)\s*$",
        exception: None,
    },
    Rule {
        category: SyntheticNoteCategory::MilestoneChange,
        pattern: r"(?i)^\s*(changed milestone to |milestone changed to |removed milestone)",
        exception: None,
    },
    Rule {
        category: SyntheticNoteCategory::LabelChange,
        pattern: r"(?i)^\s*(added|removed) ~.* labels?\s*$",
        exception: None,
    },
    Rule {
        category: SyntheticNoteCategory::Reassignment,
        pattern: r"(?i)^\s*(reassigned to |assigned to @|unassigned @)",
        exception: None,
    },
    Rule {
        category: SyntheticNoteCategory::CrossReference,
        pattern: r"(?i)^\s*mentioned in (issue|merge request|commit) ",
        exception: None,
    },
];

struct CompiledRule {
    category: SyntheticNoteCategory,
    pattern: Regex,
    exception: Option<Regex>,
}

/// Compiled classifier for narration notes.
pub struct NoteFilter {
    rules: Vec<CompiledRule>,
}

impl NoteFilter {
    /// Compiles the classification table.
    ///
    /// # Errors
    ///
    /// Returns an error if a table pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let rules = RULES
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    category: rule.category,
                    pattern: Regex::new(rule.pattern)?,
                    exception: rule.exception.map(Regex::new).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { rules })
    }

    /// Returns the narration category of `body`, if any.
    #[must_use]
    pub fn classify(&self, body: &str) -> Option<SyntheticNoteCategory> {
        self.rules
            .iter()
            .find(|rule| {
                rule.pattern.is_match(body)
                    && !rule
                        .exception
                        .as_ref()
                        .is_some_and(|exception| exception.is_match(body))
            })
            .map(|rule| rule.category)
    }

    /// Drops narration notes and orders the rest by id.
    #[must_use]
    pub fn transferable(&self, notes: Vec<SourceNote>) -> Vec<SourceNote> {
        let mut notes: Vec<SourceNote> = notes
            .into_iter()
            .filter(|note| self.classify(&note.body).is_none())
            .collect();
        notes.sort_by_key(|note| note.id);
        notes
    }
}
