//! Content stores: where entries live between builds.
//!
//! Two backends implement [`ContentStore`]:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | content assembled in code, tests |
//! | [`SqliteStore`] | the `posts`/`projects` database managed by the CLI |
//!
//! Both keep the same contract:
//!
//! - slugs are unique per kind; `create` fails with [`StoreError::DuplicateSlug`]
//! - `update` merges a [`Patch`] and stamps `updated_at`
//! - `soft_delete` copies the full record into the kind's archive with a
//!   `deleted_at` stamp, then removes it from the live set, as one atomic step
//! - the archive is append-only; deleting a recreated slug adds another row
//! - `list_all` orders by `created_at` ascending, then `id`
//! - tags and skills containing a comma are rejected with
//!   [`StoreError::Invalid`], since SQLite keeps them in one comma-joined
//!   column
//!
//! Mutations take `&mut self`; a build only needs `&self`.

use crate::entity::{self, ArchivedEntry, Details, Draft, Entry, Kind, Patch, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use migrations::latest_version;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} entry with slug '{slug}' already exists")]
    DuplicateSlug { kind: Kind, slug: String },
    #[error("no {kind} entry with slug '{slug}'")]
    NotFound { kind: Kind, slug: String },
    #[error("expected a {expected} entry, got {found} fields")]
    WrongKind { expected: Kind, found: Kind },
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {found} is newer than supported {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
    #[error("Cannot create database directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Storage for entries of every kind.
pub trait ContentStore {
    /// Insert a new entry and return it with its generated id.
    fn create(&mut self, kind: Kind, draft: Draft) -> Result<Entry, StoreError>;

    /// Merge `patch` into the entry with `slug`.
    fn update(&mut self, kind: Kind, slug: &str, patch: Patch) -> Result<Entry, StoreError>;

    /// Archive the entry with `slug` and remove it from the live set.
    fn soft_delete(&mut self, kind: Kind, slug: &str) -> Result<ArchivedEntry, StoreError>;

    /// All live entries of a kind, oldest first.
    fn list_all(&self, kind: Kind) -> Result<Vec<Entry>, StoreError>;

    /// A single live entry.
    fn get(&self, kind: Kind, slug: &str) -> Result<Option<Entry>, StoreError>;

    /// Archive rows of a kind, in deletion order.
    fn list_archived(&self, kind: Kind) -> Result<Vec<ArchivedEntry>, StoreError>;

    fn exists(&self, kind: Kind, slug: &str) -> Result<bool, StoreError> {
        Ok(self.get(kind, slug)?.is_some())
    }
}

/// Reject drafts/patches whose details belong to another kind.
fn check_details(expected: Kind, details: &Details) -> Result<(), StoreError> {
    let found = details.kind();
    if expected != found {
        return Err(StoreError::WrongKind { expected, found });
    }
    entity::check_labels(details)?;
    Ok(())
}
