//! In-memory project store
//!
//! Backed by a `DashMap`, so reads never block writers to other keys and an
//! update to one record is atomic against concurrent updates of the same
//! key (last write wins).

use crate::{
    now_ms, title_or_default, NewProject, ProjectId, ProjectRecord, ProjectStore, ProjectUpdate,
    StoreError, LIST_CAP,
};
use dashmap::DashMap;

/// Process-local [`ProjectStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<ProjectId, ProjectRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn create(&self, new: NewProject) -> ProjectRecord {
        let now = now_ms();
        let record = ProjectRecord {
            id: ProjectId::new(),
            title: title_or_default(new.title),
            html: new.html,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(record.id, record.clone());
        tracing::info!(id = %record.id, title = %record.title, "project created");
        record
    }

    async fn get(&self, id: ProjectId) -> Option<ProjectRecord> {
        self.records.get(&id).map(|entry| entry.clone())
    }

    async fn update(
        &self,
        id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<ProjectRecord, StoreError> {
        // get_mut holds the shard lock, making the read-modify-write atomic.
        let mut entry = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(title) = update.title {
            entry.title = title_or_default(Some(title));
        }
        if let Some(html) = update.html {
            entry.html = html;
        }
        entry.updated_at = now_ms();
        Ok(entry.clone())
    }

    async fn list(&self) -> Vec<ProjectRecord> {
        let mut records: Vec<ProjectRecord> =
            self.records.iter().map(|entry| entry.clone()).collect();
        // Recency first; id as the tiebreaker keeps ordering stable when
        // timestamps collide within one millisecond.
        records.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(LIST_CAP);
        records
    }
}
