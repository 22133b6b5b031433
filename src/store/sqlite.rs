//! SQLite-backed content store.
//!
//! Each kind has a live table (`posts`, `projects`) and an archive table
//! (`deleted_posts`, `deleted_projects`) with the same columns plus
//! `deleted_at`. Timestamps are stored as `YYYY-MM-DD HH:MM:SS` UTC text, so
//! ordering by the text column is chronological.
//!
//! Every mutation runs in its own transaction. Soft delete copies the row into
//! the archive and deletes it from the live table inside one transaction, so a
//! crash leaves the row in exactly one of the two tables.

use super::migrations::{apply_migrations, current_user_version};
use super::{ContentStore, StoreError, check_details};
use crate::entity::{
    self, ArchivedEntry, Details, Draft, Entry, Kind, Patch, PostDetails, ProjectDetails,
    TIMESTAMP_FORMAT,
};
use chrono::NaiveDateTime;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Columns shared by every kind, in select order.
const ENTRY_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "title",
    "summary",
    "body",
    "created_at",
    "updated_at",
];

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date.
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let started_at = Instant::now();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        let store = Self::bootstrap(conn)?;
        info!(
            path = %path.display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "database opened"
        );
        Ok(store)
    }

    /// Open a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> Result<u32, StoreError> {
        current_user_version(&self.conn)
    }
}

impl ContentStore for SqliteStore {
    fn create(&mut self, kind: Kind, draft: Draft) -> Result<Entry, StoreError> {
        check_details(kind, &draft.details)?;
        let tx = self.conn.transaction()?;

        if fetch_entry(&tx, kind, &draft.slug)?.is_some() {
            return Err(StoreError::DuplicateSlug {
                kind,
                slug: draft.slug,
            });
        }

        let created_at = draft.created_at.unwrap_or_else(entity::now_utc);
        let mut values = vec![
            Value::Text(draft.slug.clone()),
            Value::Text(draft.title.clone()),
            optional_text(draft.summary.clone()),
            Value::Text(draft.body.clone()),
            Value::Text(format_timestamp(created_at)),
            Value::Null,
        ];
        values.extend(detail_values(&draft.details));

        let columns = writable_columns(kind);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            kind.plural(),
            columns.join(", ")
        );
        tx.execute(&sql, params_from_iter(values))
            .map_err(|err| duplicate_or(err, kind, &draft.slug))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(%kind, slug = %draft.slug, id, "entry created");
        Ok(Entry::from_draft(id, draft, created_at))
    }

    fn update(&mut self, kind: Kind, slug: &str, patch: Patch) -> Result<Entry, StoreError> {
        if let Some(details) = &patch.details {
            check_details(kind, details)?;
        }
        let tx = self.conn.transaction()?;

        let mut entry = fetch_entry(&tx, kind, slug)?.ok_or_else(|| StoreError::NotFound {
            kind,
            slug: slug.to_string(),
        })?;
        entry.apply(patch, entity::now_utc());

        let mut values = vec![
            Value::Text(entry.slug.clone()),
            Value::Text(entry.title.clone()),
            optional_text(entry.summary.clone()),
            Value::Text(entry.body.clone()),
            Value::Text(format_timestamp(entry.created_at)),
            optional_text(entry.updated_at.map(format_timestamp)),
        ];
        values.extend(detail_values(&entry.details));
        values.push(Value::Integer(entry.id));

        let assignments = writable_columns(kind)
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {assignments} WHERE id = ?", kind.plural());
        tx.execute(&sql, params_from_iter(values))?;
        tx.commit()?;

        info!(%kind, slug, "entry updated");
        Ok(entry)
    }

    fn soft_delete(&mut self, kind: Kind, slug: &str) -> Result<ArchivedEntry, StoreError> {
        let tx = self.conn.transaction()?;

        let entry = fetch_entry(&tx, kind, slug)?.ok_or_else(|| StoreError::NotFound {
            kind,
            slug: slug.to_string(),
        })?;
        let deleted_at = entity::now_utc();

        let columns = select_columns(kind).join(", ");
        let archive_sql = format!(
            "INSERT INTO deleted_{table} ({columns}, deleted_at)
             SELECT {columns}, ?1 FROM {table} WHERE slug = ?2",
            table = kind.plural(),
        );
        tx.execute(&archive_sql, params![format_timestamp(deleted_at), slug])?;
        tx.execute(
            &format!("DELETE FROM {} WHERE slug = ?1", kind.plural()),
            params![slug],
        )?;
        tx.commit()?;

        info!(%kind, slug, "entry archived");
        Ok(ArchivedEntry { entry, deleted_at })
    }

    fn list_all(&self, kind: Kind) -> Result<Vec<Entry>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at ASC, id ASC",
            select_columns(kind).join(", "),
            kind.plural()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], |row| read_entry(kind, row))?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(%kind, count = entries.len(), "listed entries");
        Ok(entries)
    }

    fn get(&self, kind: Kind, slug: &str) -> Result<Option<Entry>, StoreError> {
        fetch_entry(&self.conn, kind, slug)
    }

    fn list_archived(&self, kind: Kind) -> Result<Vec<ArchivedEntry>, StoreError> {
        let sql = format!(
            "SELECT {}, deleted_at FROM deleted_{} ORDER BY rowid ASC",
            select_columns(kind).join(", "),
            kind.plural()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ArchivedEntry {
                    entry: read_entry(kind, row)?,
                    deleted_at: timestamp_column(row, "deleted_at")?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn fetch_entry(conn: &Connection, kind: Kind, slug: &str) -> Result<Option<Entry>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE slug = ?1",
        select_columns(kind).join(", "),
        kind.plural()
    );
    Ok(conn
        .query_row(&sql, params![slug], |row| read_entry(kind, row))
        .optional()?)
}

/// Kind-specific columns, in the order [`detail_values`] produces them.
fn detail_columns(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Post => &["author", "tags", "thumbnail_url"],
        Kind::Project => &["project_type", "duration", "skills"],
    }
}

/// Every column of a kind's table, `id` first.
fn select_columns(kind: Kind) -> Vec<&'static str> {
    ENTRY_COLUMNS
        .iter()
        .chain(detail_columns(kind))
        .copied()
        .collect()
}

/// Columns written by insert/update (everything except `id`).
fn writable_columns(kind: Kind) -> Vec<&'static str> {
    select_columns(kind).into_iter().skip(1).collect()
}

fn detail_values(details: &Details) -> Vec<Value> {
    match details {
        Details::Post(post) => vec![
            optional_text(post.author.clone()),
            optional_text(entity::join_list(&post.tags)),
            optional_text(post.thumbnail_url.clone()),
        ],
        Details::Project(project) => vec![
            Value::Text(project.project_type.clone()),
            optional_text(project.duration.clone()),
            optional_text(entity::join_list(&project.skills)),
        ],
    }
}

/// Read a row selected with [`select_columns`].
///
/// Archive rows may hold NULLs anywhere; missing text reads as empty.
fn read_entry(kind: Kind, row: &Row<'_>) -> rusqlite::Result<Entry> {
    let text = |column: &str| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
    };
    let details = match kind {
        Kind::Post => Details::Post(PostDetails {
            author: row.get("author")?,
            tags: entity::split_list(&text("tags")?),
            thumbnail_url: row.get("thumbnail_url")?,
        }),
        Kind::Project => Details::Project(ProjectDetails {
            project_type: row
                .get::<_, Option<String>>("project_type")?
                .unwrap_or_else(|| entity::DEFAULT_PROJECT_TYPE.to_string()),
            duration: row.get("duration")?,
            skills: entity::split_list(&text("skills")?),
        }),
    };
    Ok(Entry {
        id: row.get::<_, Option<i64>>("id")?.unwrap_or_default(),
        slug: text("slug")?,
        title: text("title")?,
        summary: row.get("summary")?,
        body: text("body")?,
        created_at: timestamp_column(row, "created_at")?.unwrap_or_default(),
        updated_at: timestamp_column(row, "updated_at")?,
        details,
    })
}

fn timestamp_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    let Some(text) = row.get::<_, Option<String>>(column)? else {
        return Ok(None);
    };
    entity::parse_timestamp(&text).map(Some).map_err(|err| {
        let idx = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
    })
}

fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn optional_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

/// Map a UNIQUE violation on insert to [`StoreError::DuplicateSlug`].
fn duplicate_or(err: rusqlite::Error, kind: Kind, slug: &str) -> StoreError {
    match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => StoreError::DuplicateSlug {
            kind,
            slug: slug.to_string(),
        },
        _ => StoreError::Sqlite(err),
    }
}
