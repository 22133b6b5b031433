//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Entries lead with
//! their title (or slug) and a positional index; output paths and statuses
//! follow as secondary context. Diagnostics go through `tracing` on stderr;
//! everything here is the user-facing summary on stdout.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Home → index.html (created)
//! Posts → posts/index.html (created)
//!     001 Hello → posts/hello.html (created)
//! Projects → projects/index.html (unchanged)
//!
//! Static
//!     static/site.css (created)
//!
//! Skipped
//!     post 'draft': missing required field `title`
//!
//! Built 4 pages: 3 created, 0 updated, 1 unchanged (4 total) in dist
//! ```
//!
//! ## Import
//!
//! ```text
//! Posts
//!     + hello
//!     * intro (updated)
//!     = kept (already imported)
//!     ! short.md: expected at least 6 lines, found 2
//! Imported 2 posts, skipped 1 file
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::entity::{ArchivedEntry, Entry, Kind};
use crate::generate::{BuildReport, CheckReport, FileOutcome, SkippedItem};
use crate::ingest::IngestReport;
use crate::view;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// `1 file`, `2 files`.
fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn skipped_line(item: &SkippedItem) -> String {
    format!(
        "{}{} '{}': {}",
        indent(1),
        item.kind.singular(),
        item.slug,
        item.reason
    )
}

fn outcome_arrow(label: &str, outcome: &FileOutcome) -> String {
    format!("{} \u{2192} {} ({})", label, outcome.path, outcome.status)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the summary of a build pass.
///
/// Pages are grouped as Home and About, then each kind's listing followed by
/// its detail pages in listing order.
pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for path in ["index.html", view::ABOUT_PATH] {
        if let Some(page) = report.pages.iter().find(|p| p.path == path) {
            lines.push(outcome_arrow(&page.label, page));
        }
    }
    for kind in Kind::ALL {
        let listing_path = view::listing_path(kind);
        if let Some(listing) = report.pages.iter().find(|p| p.path == listing_path) {
            lines.push(outcome_arrow(&listing.label, listing));
        }
        let details = report
            .pages
            .iter()
            .filter(|p| p.kind == Some(kind) && p.path != listing_path);
        for (i, page) in details.enumerate() {
            let label = format!("{} {}", format_index(i + 1), page.label);
            lines.push(format!("{}{}", indent(1), outcome_arrow(&label, page)));
        }
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Static".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{} ({})", indent(1), asset.path, asset.status));
        }
    }

    if !report.seo.is_empty() {
        lines.push(String::new());
        lines.push("SEO".to_string());
        for file in &report.seo {
            lines.push(format!("{}{} ({})", indent(1), file.path, file.status));
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        lines.extend(report.skipped.iter().map(skipped_line));
    }

    if !report.write_failures.is_empty() {
        lines.push(String::new());
        lines.push("Write failures".to_string());
        for failure in &report.write_failures {
            lines.push(format!("{}{}", indent(1), failure));
        }
    }

    if !report.pruned.is_empty() {
        lines.push(String::new());
        lines.push("Pruned".to_string());
        for path in &report.pruned {
            lines.push(format!("{}{}", indent(1), path));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {}: {} in {}",
        plural(report.pages.len(), "page", "pages"),
        report.page_stats(),
        output_dir.display()
    ));
    if !report.skipped.is_empty() {
        lines.push(format!(
            "Skipped {} of {}",
            report.skipped.len(),
            plural(report.attempted(), "entry", "entries")
        ));
    }
    lines
}

pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    print_lines(format_build_output(report, output_dir));
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of validating store contents.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .kinds
        .iter()
        .map(|k| {
            format!(
                "{}: {}, {} valid",
                k.kind.heading(),
                plural(k.attempted, "entry", "entries"),
                k.valid
            )
        })
        .collect();

    if report.skipped.is_empty() {
        lines.push("No problems found".to_string());
    } else {
        lines.push(String::new());
        lines.push("Problems".to_string());
        lines.extend(report.skipped.iter().map(skipped_line));
        lines.push(format!(
            "{} of {} would be skipped",
            report.skipped.len(),
            plural(report.attempted(), "entry", "entries")
        ));
    }
    lines
}

pub fn print_check_output(report: &CheckReport) {
    print_lines(format_check_output(report));
}

// ============================================================================
// Import
// ============================================================================

/// Format the result of importing Markdown files for one kind.
pub fn format_ingest_output(report: &IngestReport) -> Vec<String> {
    let mut lines = vec![report.kind.heading().to_string()];
    for slug in &report.added {
        lines.push(format!("{}+ {}", indent(1), slug));
    }
    for slug in &report.updated {
        lines.push(format!("{}* {} (updated)", indent(1), slug));
    }
    for slug in &report.replaced {
        lines.push(format!("{}~ {} (replaced)", indent(1), slug));
    }
    for slug in &report.existing {
        lines.push(format!("{}= {} (already imported)", indent(1), slug));
    }
    for (file, reason) in &report.skipped {
        lines.push(format!("{}! {}: {}", indent(1), file, reason));
    }

    let mut summary = format!(
        "Imported {} {}",
        report.imported(),
        report.kind.plural()
    );
    if !report.skipped.is_empty() {
        summary.push_str(&format!(
            ", skipped {}",
            plural(report.skipped.len(), "file", "files")
        ));
    }
    lines.push(summary);
    lines
}

pub fn print_ingest_output(report: &IngestReport) {
    print_lines(format_ingest_output(report));
}

// ============================================================================
// Store inspection
// ============================================================================

/// Format live entries of a kind, one header line plus an indented summary.
///
/// ```text
/// 001 hello  Hello World (May 06, 2024)
///     A first post.
/// ```
pub fn format_entry_list(kind: Kind, entries: &[Entry], date_format: &str) -> Vec<String> {
    if entries.is_empty() {
        return vec![format!("No {}", kind.plural())];
    }
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "{} {}  {} ({})",
            format_index(i + 1),
            entry.slug,
            entry.title,
            entry.created_at.format(date_format)
        ));
        if let Some(summary) = entry.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(format!("{}{}", indent(1), truncate_desc(summary.trim(), 60)));
        }
    }
    lines
}

/// Format archive rows of a kind, in deletion order.
pub fn format_archived_list(
    kind: Kind,
    archived: &[ArchivedEntry],
    date_format: &str,
) -> Vec<String> {
    if archived.is_empty() {
        return vec![format!("No archived {}", kind.plural())];
    }
    archived
        .iter()
        .enumerate()
        .map(|(i, row)| {
            format!(
                "{} {}  {} (deleted {})",
                format_index(i + 1),
                row.entry.slug,
                row.entry.title,
                row.deleted_at.format(date_format)
            )
        })
        .collect()
}

pub fn print_entry_list(kind: Kind, entries: &[Entry], date_format: &str) {
    print_lines(format_entry_list(kind, entries, date_format));
}

pub fn print_archived_list(kind: Kind, archived: &[ArchivedEntry], date_format: &str) {
    print_lines(format_archived_list(kind, archived, date_format));
}

pub fn format_deleted(archived: &ArchivedEntry) -> String {
    format!(
        "Archived {} '{}' ({})",
        archived.entry.kind().singular(),
        archived.entry.slug,
        archived.entry.title
    )
}

pub fn format_init_db(path: &Path, schema_version: u32) -> String {
    format!(
        "Database ready: {} (schema version {})",
        path.display(),
        schema_version
    )
}

// ============================================================================
// Tests
// ============================================================================
