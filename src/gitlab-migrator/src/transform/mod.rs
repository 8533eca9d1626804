//! Body rewriting for issues, merge requests and comments.
//!
//! Every transferred body gets an attribution line naming the original author
//! and date, then user mentions and cross-project references are rewritten
//! through the configured user and project maps.

mod notes;

pub use notes::{NoteFilter, SyntheticNoteCategory};

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};

use crate::config::{ProjectMap, UserMap};
use crate::source::{SourceIssue, SourceMergeRequest, SourceNote};

/// Substring marking a reference to an uploaded file.
pub const UPLOADS_MARKER: &str = "/uploads/";

/// Returns true if `body` references an uploaded file.
#[must_use]
pub fn has_attachment(body: &str) -> bool {
    body.contains(UPLOADS_MARKER)
}

/// Items carrying authorship metadata for the attribution line.
pub trait Attributed {
    /// Username of the original author.
    fn author_username(&self) -> Option<&str>;

    /// When the item was created in the source project.
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl Attributed for SourceIssue {
    fn author_username(&self) -> Option<&str> {
        self.author.as_ref().map(|user| user.username.as_str())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Attributed for SourceNote {
    fn author_username(&self) -> Option<&str> {
        self.author.as_ref().map(|user| user.username.as_str())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Attributed for SourceMergeRequest {
    fn author_username(&self) -> Option<&str> {
        self.author.as_ref().map(|user| user.username.as_str())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Formats a timestamp as e.g. `Jan 5, 2019, 14:03` (UTC, 24-hour clock).
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %H:%M").to_string()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Returns true if `rest` continues the username that precedes it.
///
/// Usernames never end in `.`, so a dot only continues the name when another
/// name character follows it (`@bob.smith`, not `Thanks @bob.`).
fn continues_name(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some('.') => chars.next().is_some_and(is_name_char),
        Some(c) => is_name_char(c),
        None => false,
    }
}

/// Rewrites bodies for the destination.
pub struct TextTransformer {
    source_name: String,
    usermap: UserMap,
    projectmap: ProjectMap,
    references: Option<Regex>,
}

impl TextTransformer {
    /// Builds the transformer, compiling the reference pattern once.
    ///
    /// `source_name` appears in the attribution line ("In GitLab by ...").
    ///
    /// # Errors
    ///
    /// Returns an error if the combined map keys exceed the regex size limit.
    pub fn new(
        source_name: &str,
        usermap: &UserMap,
        projectmap: &ProjectMap,
    ) -> Result<Self, regex::Error> {
        let references = if usermap.is_empty() && projectmap.is_empty() {
            None
        } else {
            Some(Regex::new(&reference_pattern(usermap, projectmap))?)
        };

        Ok(Self {
            source_name: source_name.to_string(),
            usermap: usermap.clone(),
            projectmap: projectmap.clone(),
            references,
        })
    }

    /// Produces the destination body for `item`.
    ///
    /// Items without author or creation date (placeholders) are returned
    /// unchanged. Otherwise the attribution line is prepended and mapped
    /// mentions and references are rewritten in the result.
    #[must_use]
    pub fn transform(&self, body: &str, item: &impl Attributed) -> String {
        let (Some(author), Some(created_at)) = (item.author_username(), item.created_at()) else {
            return body.to_string();
        };

        let attributed = format!(
            "In {} by @{} on {}\n\n{}",
            self.source_name,
            author,
            format_date(created_at),
            body
        );

        match &self.references {
            Some(references) => self.rewrite(references, &attributed),
            None => attributed,
        }
    }

    fn rewrite(&self, references: &Regex, text: &str) -> String {
        references
            .replace_all(text, |caps: &Captures| {
                let whole = &caps[0];
                let Some(matched) = caps.get(0) else {
                    return whole.to_string();
                };

                if let Some(user) = caps.name("user") {
                    // `@bob` inside `@bobby` when only `bob` is mapped.
                    let continued = continues_name(&text[matched.end()..]);
                    match self.usermap.get(user.as_str()) {
                        Some(mapped) if !continued => format!("@{mapped}"),
                        _ => whole.to_string(),
                    }
                } else if let Some(project) = caps.name("project") {
                    // `group/project#` inside `subgroup/project#`.
                    let previous = text[..matched.start()].chars().next_back();
                    match self.projectmap.get(project.as_str()) {
                        Some(mapped) if !previous.is_some_and(|c| is_name_char(c) || c == '/') => {
                            format!("{mapped}#")
                        }
                        _ => whole.to_string(),
                    }
                } else {
                    whole.to_string()
                }
            })
            .into_owned()
    }
}

/// Builds `@(?P<user>a|b)|(?P<project>x|y)#` from the map keys, longest key first.
fn reference_pattern(usermap: &UserMap, projectmap: &ProjectMap) -> String {
    let alternation = |keys: Vec<&String>| {
        let mut keys = keys;
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keys.iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|")
    };

    let mut branches = Vec::new();
    if !usermap.is_empty() {
        branches.push(format!(
            "@(?P<user>{})",
            alternation(usermap.keys().collect())
        ));
    }
    if !projectmap.is_empty() {
        branches.push(format!(
            "(?P<project>{})#",
            alternation(projectmap.keys().collect())
        ));
    }
    branches.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceUser;
    use chrono::TimeZone;

    fn authored_note(body: &str) -> SourceNote {
        SourceNote {
            id: 1,
            body: body.to_string(),
            author: Some(SourceUser {
                id: 7,
                username: "jdoe".to_string(),
                name: "John Doe".to_string(),
            }),
            created_at: Some(Utc.with_ymd_and_hms(2019, 1, 5, 14, 3, 0).unwrap()),
        }
    }

    fn maps() -> (UserMap, ProjectMap) {
        let usermap = UserMap::from([
            ("jdoe".to_string(), "john-doe".to_string()),
            ("bob".to_string(), "robert".to_string()),
        ]);
        let projectmap =
            ProjectMap::from([("group/project".to_string(), "Org/Project".to_string())]);
        (usermap, projectmap)
    }

    #[test]
    fn formats_date_with_short_month_and_24h_clock() {
        let date = Utc.with_ymd_and_hms(2019, 11, 25, 9, 7, 0).unwrap();
        assert_eq!(format_date(date), "Nov 25, 2019, 09:07");
    }

    #[test]
    fn prepends_attribution_without_maps() {
        let transformer =
            TextTransformer::new("GitLab", &UserMap::new(), &ProjectMap::new()).unwrap();
        let note = authored_note("Works for me, @bob");

        assert_eq!(
            transformer.transform(&note.body, &note),
            "In GitLab by @jdoe on Jan 5, 2019, 14:03\n\nWorks for me, @bob"
        );
    }

    #[test]
    fn leaves_unattributed_items_untouched() {
        let (usermap, projectmap) = maps();
        let transformer = TextTransformer::new("GitLab", &usermap, &projectmap).unwrap();
        let mut note = authored_note("cc @bob");
        note.author = None;

        assert_eq!(transformer.transform(&note.body, &note), "cc @bob");
    }

    #[test]
    fn returns_mapped_mentions_and_references() {
        let (usermap, projectmap) = maps();
        let transformer = TextTransformer::new("GitLab", &usermap, &projectmap).unwrap();
        let note = authored_note("cc @bob, see group/project#12 and @carol");

        assert_eq!(
            transformer.transform(&note.body, &note),
            "In GitLab by @john-doe on Jan 5, 2019, 14:03\n\n\
             cc @robert, see Org/Project#12 and @carol"
        );
    }

    #[test]
    fn does_not_rewrite_longer_names_or_paths() {
        let (usermap, projectmap) = maps();
        let transformer = TextTransformer::new("GitLab", &usermap, &projectmap).unwrap();
        let note = authored_note("@bobby and subgroup/project#3 and bob@example.com");

        let body = transformer.transform(&note.body, &note);

        assert!(body.ends_with("@bobby and subgroup/project#3 and bob@example.com"));
    }

    #[test]
    fn rewrites_mentions_ending_a_sentence() {
        let (usermap, projectmap) = maps();
        let transformer = TextTransformer::new("GitLab", &usermap, &projectmap).unwrap();
        let note = authored_note("Thanks @bob. Also ping @bob, and (@bob)\nbye @bob");

        assert!(transformer.transform(&note.body, &note).ends_with(
            "Thanks @robert. Also ping @robert, and (@robert)\nbye @robert"
        ));
    }

    #[test]
    fn dotted_usernames_are_not_split() {
        let (usermap, projectmap) = maps();
        let transformer = TextTransformer::new("GitLab", &usermap, &projectmap).unwrap();
        let note = authored_note("ask @bob.smith or @bob");

        assert!(transformer
            .transform(&note.body, &note)
            .ends_with("ask @bob.smith or @robert"));
    }

    #[test]
    fn prefers_longest_key() {
        let usermap = UserMap::from([
            ("bob".to_string(), "robert".to_string()),
            ("bobby".to_string(), "bobby-gh".to_string()),
        ]);
        let transformer = TextTransformer::new("GitLab", &usermap, &ProjectMap::new()).unwrap();
        let note = authored_note("@bobby @bob");

        assert!(transformer
            .transform(&note.body, &note)
            .ends_with("@bobby-gh @robert"));
    }

    #[test]
    fn escapes_regex_metacharacters_in_keys() {
        let projectmap =
            ProjectMap::from([("my.group/pro+ject".to_string(), "Org/Project".to_string())]);
        let transformer =
            TextTransformer::new("GitLab", &UserMap::new(), &projectmap).unwrap();
        let note = authored_note("my.group/pro+ject#1 myxgroup/proooject#1");

        assert!(transformer
            .transform(&note.body, &note)
            .ends_with("Org/Project#1 myxgroup/proooject#1"));
    }

    #[test]
    fn detects_upload_references() {
        assert!(has_attachment("![img](/uploads/avatar.png)"));
        assert!(!has_attachment("no files here"));
    }
}
