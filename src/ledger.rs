//! Record of the files a build wrote.
//!
//! The builder regenerates every page on every run. The ledger lets it tell
//! what that run actually changed, and clean up after content that went away:
//!
//! - each written file is recorded under its output-relative path together
//!   with the SHA-256 of its content;
//! - comparing a page's hash with the previous ledger classifies it as
//!   created, updated or unchanged;
//! - paths in the previous ledger that the current build did not produce are
//!   stale and get pruned. Files the builder never wrote are not in any
//!   ledger, so they are never touched.
//!
//! ## Storage
//!
//! The ledger is a JSON file at `<output_dir>/.build-manifest.json`. Paths are
//! kept in a sorted map so the file itself is byte-identical across rebuilds
//! of unchanged content.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the ledger file within the output directory.
pub const LEDGER_FILENAME: &str = ".build-manifest.json";

/// Version of the ledger format. A mismatch is treated as "no previous build".
const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputLedger {
    pub version: u32,
    /// Output-relative path (`/`-separated) → SHA-256 hex of the content.
    pub files: BTreeMap<String, String>,
}

impl Default for OutputLedger {
    fn default() -> Self {
        Self::empty()
    }
}

impl OutputLedger {
    pub fn empty() -> Self {
        Self {
            version: LEDGER_VERSION,
            files: BTreeMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty ledger if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(ledger_path(output_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(ledger) if ledger.version == LEDGER_VERSION => ledger,
            _ => Self::empty(),
        }
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(ledger_path(output_dir), json)
    }

    pub fn record(&mut self, path: &str, hash: String) {
        self.files.insert(path.to_string(), hash);
    }

    pub fn hash_of(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// How a file with `hash` at `path` compares to this (previous) ledger.
    ///
    /// A recorded file that has since disappeared from disk counts as created.
    pub fn classify(&self, path: &str, hash: &str, output_dir: &Path) -> FileStatus {
        match self.hash_of(path) {
            Some(previous) if output_dir.join(path).exists() => {
                if previous == hash {
                    FileStatus::Unchanged
                } else {
                    FileStatus::Updated
                }
            }
            _ => FileStatus::Created,
        }
    }

    /// Paths recorded here that `current` no longer contains, sorted.
    pub fn stale_paths(&self, current: &OutputLedger) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| !current.files.contains_key(*path))
            .cloned()
            .collect()
    }
}

/// What a build did to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStatus {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Created => "created",
            FileStatus::Updated => "updated",
            FileStatus::Unchanged => "unchanged",
        })
    }
}

/// SHA-256 of `bytes`, as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Resolve the ledger path for an output directory.
pub fn ledger_path(output_dir: &Path) -> PathBuf {
    output_dir.join(LEDGER_FILENAME)
}

/// Per-status file counts for a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
}

impl FileStats {
    pub fn count(&mut self, status: FileStatus) {
        match status {
            FileStatus::Created => self.created += 1,
            FileStatus::Updated => self.updated += 1,
            FileStatus::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.created + self.updated + self.unchanged
    }
}

impl fmt::Display for FileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.updated == 0 && self.unchanged == 0 {
            write!(f, "{} created", self.created)
        } else {
            write!(
                f,
                "{} created, {} updated, {} unchanged ({} total)",
                self.created,
                self.updated,
                self.unchanged,
                self.total()
            )
        }
    }
}
