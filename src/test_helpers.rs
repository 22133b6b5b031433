//! Shared test utilities.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let created = ts("2024-05-06 07:08:09");
//! let files = output_files(tmp.path());
//! assert_eq!(files, vec!["index.html", "posts/hello.html", "posts/index.html"]);
//! ```

use crate::entity::{self, TIMESTAMP_FORMAT};
use crate::ledger::LEDGER_FILENAME;
use crate::view::ViewOptions;
use chrono::NaiveDateTime;
use std::path::Path;
use walkdir::WalkDir;

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp. Panics on bad input.
pub fn ts(text: &str) -> NaiveDateTime {
    entity::parse_timestamp(text)
        .unwrap_or_else(|err| panic!("bad timestamp '{text}' (want {TIMESTAMP_FORMAT}): {err}"))
}

/// View options with fixed values.
pub fn view_options() -> ViewOptions {
    ViewOptions {
        date_format: "%b %d, %Y".to_string(),
        default_author: "Site Owner".to_string(),
    }
}

/// Every file under `root` as sorted `/`-separated relative paths, ledger excluded.
pub fn output_files(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path().strip_prefix(root).ok().map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
        })
        .filter(|rel| rel != LEDGER_FILENAME)
        .collect();
    files.sort();
    files
}

/// Read an output file relative to `root`. Panics with the available files on miss.
pub fn read_output(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap_or_else(|err| {
        panic!(
            "cannot read {rel}: {err}. Available: {:?}",
            output_files(root)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_files_are_sorted_and_skip_ledger() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("posts")).unwrap();
        std::fs::write(tmp.path().join("posts/b.html"), "").unwrap();
        std::fs::write(tmp.path().join("index.html"), "").unwrap();
        std::fs::write(tmp.path().join(LEDGER_FILENAME), "{}").unwrap();

        assert_eq!(output_files(tmp.path()), vec!["index.html", "posts/b.html"]);
    }
}
