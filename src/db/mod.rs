pub mod config;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod sqlite_schema;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::db::config::DbConfig;
use crate::db::memory::MemoryStore;
use crate::db::models::{DeckSummary, LessonSource, NewVocabularyItem, ProgressRecord, VocabularyItem};
use crate::db::sqlite::SqliteStore;

/// Immutable vocabulary items. Listing order is ascending level, then id.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    async fn insert_items(&self, items: Vec<NewVocabularyItem>) -> Result<Vec<VocabularyItem>, StoreError>;

    async fn get_item(&self, id: i64) -> Result<Option<VocabularyItem>, StoreError>;

    /// Items that exist among `ids`, ordered by id. Unknown ids are skipped.
    async fn get_items(&self, ids: &[i64]) -> Result<Vec<VocabularyItem>, StoreError>;

    async fn list_items(&self, source: &LessonSource) -> Result<Vec<VocabularyItem>, StoreError>;

    async fn count_items(&self) -> Result<u64, StoreError>;

    /// Case-insensitive substring match over written form, reading and gloss.
    async fn search_items(&self, query: &str, limit: usize) -> Result<Vec<VocabularyItem>, StoreError>;

    /// Distinct deck names with their item counts, ordered by name.
    async fn list_decks(&self) -> Result<Vec<DeckSummary>, StoreError>;
}

/// Mutable per-learner SRS state.
///
/// Writes are single-record: `insert_if_absent` is idempotent on (learner, item) and
/// `compare_and_swap` only succeeds when the stored version equals `record.version`.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress(&self, learner_id: &str, item_id: i64) -> Result<Option<ProgressRecord>, StoreError>;

    async fn list_progress(&self, learner_id: &str) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Non-mastered records with `next_due_at <= now`, ordered by due time.
    async fn list_due(&self, learner_id: &str, now: DateTime<Utc>) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Returns `false` when a record for the pair already existed.
    async fn insert_if_absent(&self, record: &ProgressRecord) -> Result<bool, StoreError>;

    /// Writes `record` if the stored version still equals `record.version`; the
    /// returned record carries the bumped version.
    async fn compare_and_swap(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError>;

    /// Removes every record and activity day of the learner.
    async fn delete_all(&self, learner_id: &str) -> Result<u64, StoreError>;

    async fn record_activity(&self, learner_id: &str, day: NaiveDate) -> Result<(), StoreError>;

    /// Active days in ascending order.
    async fn activity_days(&self, learner_id: &str) -> Result<Vec<NaiveDate>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct Stores {
    pub vocabulary: Arc<dyn VocabularyStore>,
    pub progress: Arc<dyn ProgressStore>,
    pub backend: &'static str,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        let vocabulary: Arc<dyn VocabularyStore> = store.clone();
        let progress: Arc<dyn ProgressStore> = store;
        Self {
            vocabulary,
            progress,
            backend: "memory",
        }
    }

    pub async fn from_config(config: &DbConfig) -> Result<Self, DbInitError> {
        let Some(url) = config.database_url.as_deref() else {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            return Ok(Self::in_memory());
        };

        let store = Arc::new(SqliteStore::connect(url, config).await?);
        tracing::info!(url = %url, "sqlite store ready");
        let vocabulary: Arc<dyn VocabularyStore> = store.clone();
        let progress: Arc<dyn ProgressStore> = store;
        Ok(Self {
            vocabulary,
            progress,
            backend: "sqlite",
        })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("version conflict on learner {learner_id} item {item_id}")]
    Conflict { learner_id: String, item_id: i64 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
