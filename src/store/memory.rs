use super::{ContentStore, StoreError, check_details};
use crate::entity::{self, ArchivedEntry, Draft, Entry, Kind, Patch};
use std::collections::BTreeMap;

/// In-memory store. Mutations are single-step, so they are trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: i64,
    live: BTreeMap<Kind, Vec<Entry>>,
    archive: BTreeMap<Kind, Vec<ArchivedEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from drafts, failing on the first rejected one.
    pub fn with_drafts(drafts: impl IntoIterator<Item = Draft>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for draft in drafts {
            store.create(draft.kind(), draft)?;
        }
        Ok(store)
    }

    fn position(&self, kind: Kind, slug: &str) -> Option<usize> {
        self.live
            .get(&kind)
            .and_then(|entries| entries.iter().position(|e| e.slug == slug))
    }

    fn not_found(kind: Kind, slug: &str) -> StoreError {
        StoreError::NotFound {
            kind,
            slug: slug.to_string(),
        }
    }
}

impl ContentStore for MemoryStore {
    fn create(&mut self, kind: Kind, draft: Draft) -> Result<Entry, StoreError> {
        check_details(kind, &draft.details)?;
        if self.position(kind, &draft.slug).is_some() {
            return Err(StoreError::DuplicateSlug {
                kind,
                slug: draft.slug,
            });
        }
        self.next_id += 1;
        let entry = Entry::from_draft(self.next_id, draft, entity::now_utc());
        self.live.entry(kind).or_default().push(entry.clone());
        Ok(entry)
    }

    fn update(&mut self, kind: Kind, slug: &str, patch: Patch) -> Result<Entry, StoreError> {
        if let Some(details) = &patch.details {
            check_details(kind, details)?;
        }
        let idx = self
            .position(kind, slug)
            .ok_or_else(|| Self::not_found(kind, slug))?;
        let entries = self.live.entry(kind).or_default();
        entries[idx].apply(patch, entity::now_utc());
        Ok(entries[idx].clone())
    }

    fn soft_delete(&mut self, kind: Kind, slug: &str) -> Result<ArchivedEntry, StoreError> {
        let idx = self
            .position(kind, slug)
            .ok_or_else(|| Self::not_found(kind, slug))?;
        let entry = self.live.entry(kind).or_default().remove(idx);
        let archived = ArchivedEntry {
            entry,
            deleted_at: entity::now_utc(),
        };
        self.archive.entry(kind).or_default().push(archived.clone());
        Ok(archived)
    }

    fn list_all(&self, kind: Kind) -> Result<Vec<Entry>, StoreError> {
        let mut entries = self.live.get(&kind).cloned().unwrap_or_default();
        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }

    fn get(&self, kind: Kind, slug: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self
            .live
            .get(&kind)
            .and_then(|entries| entries.iter().find(|e| e.slug == slug))
            .cloned())
    }

    fn list_archived(&self, kind: Kind) -> Result<Vec<ArchivedEntry>, StoreError> {
        Ok(self.archive.get(&kind).cloned().unwrap_or_default())
    }
}
