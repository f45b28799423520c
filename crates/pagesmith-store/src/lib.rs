//! Pagesmith Store - project persistence
//!
//! Records a project's current document alongside bookkeeping timestamps.
//! The [`ProjectStore`] trait is the seam the server depends on; the
//! bundled [`memory::MemoryStore`] keeps everything in a concurrent map
//! and is the only implementation shipped today.

#![warn(unreachable_pub)]

pub mod memory;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

pub use memory::MemoryStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Listings return at most this many records, most recently updated first.
pub const LIST_CAP: usize = 50;

/// Title used when a project is created without one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Unique project identifier (ULID: sortable, URL-safe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Ulid);

impl ProjectId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_str(s)?))
    }
}

/// A stored project: the current document plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub title: String,
    pub html: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch; bumped on every update.
    pub updated_at: i64,
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub title: Option<String>,
    pub html: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub html: Option<String>,
}

/// Store failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("no project with id {0}")]
    NotFound(ProjectId),
}

/// Persistence seam for project records.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Create a record; empty or missing titles fall back to
    /// [`DEFAULT_TITLE`].
    async fn create(&self, new: NewProject) -> ProjectRecord;

    async fn get(&self, id: ProjectId) -> Option<ProjectRecord>;

    /// Apply a partial update atomically and bump `updated_at`.
    async fn update(&self, id: ProjectId, update: ProjectUpdate)
        -> Result<ProjectRecord, StoreError>;

    /// At most [`LIST_CAP`] records, most recently updated first.
    async fn list(&self) -> Vec<ProjectRecord>;
}

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn title_or_default(title: Option<String>) -> String {
    title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
