//! Markdown import.
//!
//! Posts and projects can be written as plain Markdown files and imported into
//! the store. Files live one directory per kind under the content directory:
//!
//! ```text
//! content/
//! ├── posts/
//! │   ├── hello-world.md        # slug: hello-world
//! │   └── 2024 Retro!.md        # slug: 2024-retro
//! └── projects/
//!     └── folio.md
//! ```
//!
//! ## Post files
//!
//! The first five lines are header fields, everything after is the body:
//!
//! ```text
//! # Hello World                 title (leading `#` stripped)
//! 2024-05-06 07:08:09           created date, `build.datetime_format`
//! A first post.                 summary
//! https://example.com/t.png     thumbnail URL
//! intro, meta                   comma-separated tags
//! The body, in Markdown.
//! ```
//!
//! Fewer than six lines, a date that doesn't match the format, or an empty
//! body skips the file.
//!
//! ## Project files
//!
//! Title, project type (default `Personal Project`), summary, duration and
//! skills, then the description. Only the title is mandatory in the header;
//! missing lines are left empty.
//!
//! Every draft is also checked with [`entity::validate_fields`], so a file
//! whose name slugifies to nothing is skipped rather than stored.

use crate::entity::{
    self, DEFAULT_PROJECT_TYPE, Details, Draft, Kind, Patch, PostDetails, ProjectDetails,
    ValidationError,
};
use crate::slug::slugify;
use crate::store::{ContentStore, StoreError};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Header lines before the body starts.
const HEADER_LINES: usize = 5;

/// Failure that aborts an import run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Why a single file was not imported.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("file is empty")]
    Empty,
    #[error("expected at least {expected} lines, found {found}")]
    TooShort { expected: usize, found: usize },
    #[error("date '{value}' does not match format '{format}'")]
    InvalidDate { value: String, format: String },
    #[error("body is empty")]
    EmptyBody,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("cannot read file: {0}")]
    Unreadable(String),
}

/// What one import run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub kind: Kind,
    /// Slugs created for files not seen before.
    pub added: Vec<String>,
    /// Post slugs rewritten in place from their file.
    pub updated: Vec<String>,
    /// Project slugs whose previous entry was archived and re-imported.
    pub replaced: Vec<String>,
    /// Slugs left alone because they already exist.
    pub existing: Vec<String>,
    /// File name → reason, for files that could not be imported.
    pub skipped: Vec<(String, String)>,
}

impl IngestReport {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            added: Vec::new(),
            updated: Vec::new(),
            replaced: Vec::new(),
            existing: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn imported(&self) -> usize {
        self.added.len() + self.updated.len() + self.replaced.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    AddNew,
    Rewrite,
}

// ============================================================================
// Discovery
// ============================================================================

/// Directory holding Markdown files for `kind`: `<content_dir>/<plural>`.
pub fn kind_dir(content_dir: &Path, kind: Kind) -> PathBuf {
    content_dir.join(kind.plural())
}

/// `*.md` files directly inside `dir`, sorted by path. A missing directory
/// yields no files.
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a post file's content. `file_name` provides the slug.
pub fn parse_post(
    file_name: &str,
    content: &str,
    datetime_format: &str,
) -> Result<Draft, ParseError> {
    let lines: Vec<&str> = content.trim().lines().collect();
    if lines.len() <= HEADER_LINES {
        return Err(ParseError::TooShort {
            expected: HEADER_LINES + 1,
            found: lines.len(),
        });
    }

    let title = lines[0].trim_start_matches('#').trim();
    let created_at = parse_created(lines[1].trim(), datetime_format)?;
    let body = lines[HEADER_LINES..].join("\n");
    let body = body.trim();
    if body.is_empty() {
        return Err(ParseError::EmptyBody);
    }

    let details = PostDetails {
        author: None,
        tags: entity::split_list(lines[4]),
        thumbnail_url: non_empty(lines[3]),
    };
    let draft = Draft {
        slug: slugify(file_name),
        title: title.to_string(),
        summary: non_empty(lines[2]),
        body: body.to_string(),
        created_at: Some(created_at),
        details: Details::Post(details),
    };
    entity::validate_fields(&draft.slug, &draft.title, &draft.body)?;
    Ok(draft)
}

/// Parse a project file's content. `file_name` provides the slug.
pub fn parse_project(file_name: &str, content: &str) -> Result<Draft, ParseError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ParseError::Empty);
    }
    let lines: Vec<&str> = content.lines().collect();
    let line = |i: usize| lines.get(i).map(|l| l.trim()).unwrap_or("");

    let project_type = match line(1) {
        "" => DEFAULT_PROJECT_TYPE.to_string(),
        other => other.to_string(),
    };
    let body = lines
        .get(HEADER_LINES..)
        .map(|rest| rest.join("\n"))
        .unwrap_or_default();

    let details = ProjectDetails {
        project_type,
        duration: non_empty(line(3)),
        skills: entity::split_list(line(4)),
    };
    let draft = Draft {
        slug: slugify(file_name),
        title: line(0).to_string(),
        summary: non_empty(line(2)),
        body: body.trim().to_string(),
        created_at: None,
        details: Details::Project(details),
    };
    entity::validate_fields(&draft.slug, &draft.title, &draft.body)?;
    Ok(draft)
}

/// Read and parse one file of the given kind.
pub fn parse_file(kind: Kind, path: &Path, datetime_format: &str) -> Result<Draft, ParseError> {
    let content = fs::read_to_string(path).map_err(|e| ParseError::Unreadable(e.to_string()))?;
    let name = file_name(path);
    match kind {
        Kind::Post => parse_post(&name, &content, datetime_format),
        Kind::Project => parse_project(&name, &content),
    }
}

/// Accept a full timestamp, or a date-only format as midnight.
fn parse_created(value: &str, format: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ParseError::InvalidDate {
            value: value.to_string(),
            format: format.to_string(),
        })
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// Import
// ============================================================================

/// Import files whose slug is not in the store yet. Existing entries are left
/// untouched.
pub fn add_new(
    store: &mut dyn ContentStore,
    kind: Kind,
    content_dir: &Path,
    datetime_format: &str,
) -> Result<IngestReport, IngestError> {
    import(store, kind, content_dir, datetime_format, Mode::AddNew)
}

/// Import every file, overwriting entries that already exist.
///
/// An existing post is updated in place: it keeps its id and creation time
/// and gets a fresh `updated_at`. An existing project is archived and then
/// created again from the file. Those are two store calls, so a failure
/// between them leaves the project archived but not re-created; running the
/// rewrite again restores it.
///
/// Files that fail to parse leave their existing entry in place.
pub fn rewrite_all(
    store: &mut dyn ContentStore,
    kind: Kind,
    content_dir: &Path,
    datetime_format: &str,
) -> Result<IngestReport, IngestError> {
    import(store, kind, content_dir, datetime_format, Mode::Rewrite)
}

fn import(
    store: &mut dyn ContentStore,
    kind: Kind,
    content_dir: &Path,
    datetime_format: &str,
    mode: Mode,
) -> Result<IngestReport, IngestError> {
    let dir = kind_dir(content_dir, kind);
    let files = markdown_files(&dir)?;
    info!(kind = %kind, dir = %dir.display(), files = files.len(), ?mode, "importing markdown");

    let mut report = IngestReport::new(kind);
    // Slug → file that claimed it in this run
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();

    for path in &files {
        let name = file_name(path);
        let draft = match parse_file(kind, path, datetime_format) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(file = %path.display(), reason = %err, "skipping markdown file");
                report.skipped.push((name, err.to_string()));
                continue;
            }
        };

        if let Some(first) = claimed.get(&draft.slug) {
            let reason = format!("slug '{}' already imported from {first}", draft.slug);
            warn!(file = %path.display(), %reason, "skipping markdown file");
            report.skipped.push((name, reason));
            continue;
        }
        claimed.insert(draft.slug.clone(), name.clone());

        let slug = draft.slug.clone();
        let exists = store.exists(kind, &slug)?;
        match (mode, exists) {
            (Mode::AddNew, true) => {
                debug!(kind = %kind, slug, "already in store");
                report.existing.push(slug);
            }
            (_, false) => {
                store.create(kind, draft)?;
                report.added.push(slug);
            }
            (Mode::Rewrite, true) => match kind {
                Kind::Post => {
                    store.update(kind, &slug, Patch::from(draft))?;
                    report.updated.push(slug);
                }
                Kind::Project => {
                    store.soft_delete(kind, &slug)?;
                    store.create(kind, draft)?;
                    report.replaced.push(slug);
                }
            },
        }
    }

    info!(
        kind = %kind,
        added = report.added.len(),
        updated = report.updated.len(),
        replaced = report.replaced.len(),
        skipped = report.skipped.len(),
        "import finished"
    );
    Ok(report)
}
