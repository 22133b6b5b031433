//! Content entities and their validation rules.
//!
//! Every kind of content (posts, projects) shares one [`Entry`] shape: slug,
//! title, optional summary, Markdown body and timestamps. What differs per
//! kind lives in [`Details`]. Stores hand out `Entry` values; the site builder
//! validates them with [`validate`] before rendering.
//!
//! Inputs come in two forms:
//! - [`Draft`]: the full field set for a new record (`create`).
//! - [`Patch`]: a sparse set of fields merged into an existing record (`update`).

use crate::slug;
use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Storage and import format for timestamps (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Project type used when none is given.
pub const DEFAULT_PROJECT_TYPE: &str = "Personal Project";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A content kind. Each kind gets its own table, output directory and templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Post,
    Project,
}

impl Kind {
    /// Every kind, in the order the site lists them.
    pub const ALL: [Kind; 2] = [Kind::Post, Kind::Project];

    /// Plural name: table name, output directory and listing template stem.
    pub fn plural(self) -> &'static str {
        match self {
            Kind::Post => "posts",
            Kind::Project => "projects",
        }
    }

    /// Singular name: detail template stem.
    pub fn singular(self) -> &'static str {
        match self {
            Kind::Post => "post",
            Kind::Project => "project",
        }
    }

    /// Display heading for listing pages and navigation.
    pub fn heading(self) -> &'static str {
        match self {
            Kind::Post => "Posts",
            Kind::Project => "Projects",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "post" | "posts" => Ok(Kind::Post),
            "project" | "projects" => Ok(Kind::Project),
            other => Err(format!(
                "unknown content kind `{other}` (expected `posts` or `projects`)"
            )),
        }
    }
}

/// Post-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetails {
    /// Falls back to the site author when rendering.
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
}

/// Project-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    pub project_type: String,
    /// Free text such as `Jan 2020 - Dec 2021`.
    pub duration: Option<String>,
    pub skills: Vec<String>,
}

impl Default for ProjectDetails {
    fn default() -> Self {
        Self {
            project_type: DEFAULT_PROJECT_TYPE.to_string(),
            duration: None,
            skills: Vec::new(),
        }
    }
}

/// Kind-specific part of an entry. The variant determines the entry's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Details {
    Post(PostDetails),
    Project(ProjectDetails),
}

impl Details {
    pub fn kind(&self) -> Kind {
        match self {
            Details::Post(_) => Kind::Post,
            Details::Project(_) => Kind::Project,
        }
    }

    /// Empty details for a kind.
    pub fn default_for(kind: Kind) -> Self {
        match kind {
            Kind::Post => Details::Post(PostDetails::default()),
            Kind::Project => Details::Project(ProjectDetails::default()),
        }
    }
}

/// A stored content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Store-generated identity.
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    /// Markdown source.
    pub body: String,
    pub created_at: NaiveDateTime,
    /// Set by every update, `None` until the first one.
    pub updated_at: Option<NaiveDateTime>,
    pub details: Details,
}

impl Entry {
    /// Materialize a draft as a new record.
    ///
    /// `created_at` keeps the draft's timestamp if it has one, otherwise `now`.
    pub fn from_draft(id: i64, draft: Draft, now: NaiveDateTime) -> Self {
        Self {
            id,
            slug: draft.slug,
            title: draft.title,
            summary: draft.summary,
            body: draft.body,
            created_at: draft.created_at.unwrap_or(now),
            updated_at: None,
            details: draft.details,
        }
    }

    pub fn kind(&self) -> Kind {
        self.details.kind()
    }

    /// Merge the fields present in `patch` and stamp `updated_at`.
    ///
    /// `slug`, `id` and `created_at` never change.
    pub fn apply(&mut self, patch: Patch, now: NaiveDateTime) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(details) = patch.details {
            self.details = details;
        }
        self.updated_at = Some(now);
    }
}

/// An entry moved to the archive by a soft delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEntry {
    pub entry: Entry,
    pub deleted_at: NaiveDateTime,
}

/// Full field set for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    /// `None` means "now" at insert time.
    pub created_at: Option<NaiveDateTime>,
    pub details: Details,
}

impl Draft {
    pub fn new(kind: Kind, slug: &str, title: &str, body: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            summary: None,
            body: body.to_string(),
            created_at: None,
            details: Details::default_for(kind),
        }
    }

    pub fn post(slug: &str, title: &str, body: &str) -> Self {
        Self::new(Kind::Post, slug, title, body)
    }

    pub fn project(slug: &str, title: &str, body: &str) -> Self {
        Self::new(Kind::Project, slug, title, body)
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    pub fn kind(&self) -> Kind {
        self.details.kind()
    }
}

/// Sparse update: `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub title: Option<String>,
    /// `Some(None)` clears the summary.
    pub summary: Option<Option<String>>,
    pub body: Option<String>,
    pub details: Option<Details>,
}

impl Patch {
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn summary(mut self, summary: Option<&str>) -> Self {
        self.summary = Some(summary.map(str::to_string));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn details(mut self, details: Details) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<Draft> for Patch {
    /// Replace every mutable field with the draft's values.
    fn from(draft: Draft) -> Self {
        Self {
            title: Some(draft.title),
            summary: Some(draft.summary),
            body: Some(draft.body),
            details: Some(draft.details),
        }
    }
}

/// Validate an entry before it is rendered.
///
/// Required fields must be non-blank; the slug must be safe as a file name.
pub fn validate(entry: &Entry) -> Result<(), ValidationError> {
    validate_fields(&entry.slug, &entry.title, &entry.body)?;
    check_labels(&entry.details)
}

/// Tags and skills are stored comma-joined, so no item may contain a comma.
pub fn check_labels(details: &Details) -> Result<(), ValidationError> {
    let (field, items) = match details {
        Details::Post(post) => ("tags", &post.tags),
        Details::Project(project) => ("skills", &project.skills),
    };
    match items.iter().find(|item| item.contains(',')) {
        Some(item) => Err(ValidationError::InvalidField {
            field,
            reason: format!("'{item}' contains a comma"),
        }),
        None => Ok(()),
    }
}

/// Field-level rules shared by entries and drafts.
pub fn validate_fields(slug: &str, title: &str, body: &str) -> Result<(), ValidationError> {
    if slug.trim().is_empty() {
        return Err(ValidationError::MissingField("slug"));
    }
    slug::check_slug(slug).map_err(|reason| ValidationError::InvalidField {
        field: "slug",
        reason,
    })?;
    if title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if body.trim().is_empty() {
        return Err(ValidationError::MissingField("body"));
    }
    Ok(())
}

/// Current UTC time truncated to whole seconds, matching the storage format.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

/// Parse a timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
}

/// Split a comma-separated list (`"rust, sqlite"`), dropping empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_list`]. Empty lists become `None` (stored as NULL).
pub fn join_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ts;

    fn entry(slug: &str, title: &str, body: &str) -> Entry {
        Entry::from_draft(1, Draft::post(slug, title, body), ts("2025-01-01 00:00:00"))
    }

    #[test]
    fn kind_parses_singular_and_plural() {
        assert_eq!("posts".parse::<Kind>(), Ok(Kind::Post));
        assert_eq!("Project".parse::<Kind>(), Ok(Kind::Project));
        assert!("albums".parse::<Kind>().is_err());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Kind::Post.plural(), "posts");
        assert_eq!(Kind::Project.singular(), "project");
        assert_eq!(Kind::Project.to_string(), "projects");
    }

    #[test]
    fn valid_entry_passes() {
        assert_eq!(validate(&entry("hello", "Hello", "world")), Ok(()));
    }

    #[test]
    fn blank_title_is_missing() {
        assert_eq!(
            validate(&entry("hello", "   ", "world")),
            Err(ValidationError::MissingField("title"))
        );
    }

    #[test]
    fn empty_body_is_missing() {
        assert_eq!(
            validate(&entry("hello", "Hello", "")),
            Err(ValidationError::MissingField("body"))
        );
    }

    #[test]
    fn empty_slug_is_missing() {
        assert_eq!(
            validate(&entry("", "Hello", "world")),
            Err(ValidationError::MissingField("slug"))
        );
    }

    #[test]
    fn unsafe_slug_is_invalid() {
        let err = validate(&entry("a/b", "Hello", "world")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField { field: "slug", .. }
        ));
    }

    #[test]
    fn comma_in_label_is_invalid() {
        let mut e = entry("hello", "Hello", "world");
        e.details = Details::Post(PostDetails {
            tags: vec!["rust".into(), "c, c++".into()],
            ..PostDetails::default()
        });
        let err = validate(&e).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "tags", .. }));
        assert!(err.to_string().contains("'c, c++' contains a comma"));

        let skills = Details::Project(ProjectDetails {
            skills: vec!["sql,orm".into()],
            ..ProjectDetails::default()
        });
        assert!(matches!(
            check_labels(&skills),
            Err(ValidationError::InvalidField { field: "skills", .. })
        ));
        assert_eq!(check_labels(&Details::Post(PostDetails::default())), Ok(()));
    }

    #[test]
    fn draft_without_timestamp_uses_now() {
        let now = ts("2025-03-04 05:06:07");
        let e = Entry::from_draft(7, Draft::project("p", "P", "b"), now);
        assert_eq!(e.id, 7);
        assert_eq!(e.created_at, now);
        assert_eq!(e.updated_at, None);
        assert_eq!(e.kind(), Kind::Project);
    }

    #[test]
    fn draft_timestamp_is_kept() {
        let created = ts("2024-01-01 10:00:00");
        let draft = Draft::post("p", "P", "b").with_created_at(created);
        let e = Entry::from_draft(1, draft, ts("2025-01-01 00:00:00"));
        assert_eq!(e.created_at, created);
    }

    #[test]
    fn patch_merges_only_given_fields() {
        let mut e = entry("hello", "Hello", "world");
        e.summary = Some("old".into());
        let now = ts("2025-02-01 00:00:00");

        e.apply(Patch::default().title("Hi"), now);

        assert_eq!(e.title, "Hi");
        assert_eq!(e.body, "world");
        assert_eq!(e.summary.as_deref(), Some("old"));
        assert_eq!(e.updated_at, Some(now));
    }

    #[test]
    fn patch_can_clear_summary() {
        let mut e = entry("hello", "Hello", "world");
        e.summary = Some("old".into());
        e.apply(Patch::default().summary(None), ts("2025-02-01 00:00:00"));
        assert_eq!(e.summary, None);
    }

    #[test]
    fn patch_from_draft_replaces_everything_but_identity() {
        let mut e = entry("hello", "Hello", "world");
        let created = e.created_at;
        let draft = Draft::post("ignored", "New", "text").with_summary("s");
        e.apply(Patch::from(draft), ts("2025-02-01 00:00:00"));
        assert_eq!(e.slug, "hello");
        assert_eq!(e.created_at, created);
        assert_eq!(e.title, "New");
        assert_eq!(e.summary.as_deref(), Some("s"));
    }

    #[test]
    fn list_helpers() {
        assert_eq!(split_list("rust, sqlite,, maud "), vec!["rust", "sqlite", "maud"]);
        assert_eq!(join_list(&["a".into(), "b".into()]).as_deref(), Some("a, b"));
        assert_eq!(join_list(&[]), None);
    }

    #[test]
    fn timestamp_round_trips_through_format() {
        let t = parse_timestamp("2025-08-15 14:30:00").unwrap();
        assert_eq!(t.format(TIMESTAMP_FORMAT).to_string(), "2025-08-15 14:30:00");
        assert!(parse_timestamp("15/08/2025").is_err());
    }

    #[test]
    fn now_has_no_fractional_seconds() {
        use chrono::Timelike;
        assert_eq!(now_utc().nanosecond(), 0);
    }
}
