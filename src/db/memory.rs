use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use super::models::{DeckSummary, LessonSource, NewVocabularyItem, ProgressRecord, VocabularyItem};
use super::{ProgressStore, StoreError, VocabularyStore};

type ProgressKey = (String, i64);

/// Process-local store. Every mutation happens under a single write lock, which
/// makes compare-and-swap and idempotent insert atomic.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<ItemTable>,
    progress: RwLock<HashMap<ProgressKey, ProgressRecord>>,
    activity: RwLock<HashMap<String, BTreeSet<NaiveDate>>>,
}

#[derive(Default)]
struct ItemTable {
    next_id: i64,
    rows: BTreeMap<i64, VocabularyItem>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn level_then_id(items: &mut [VocabularyItem]) {
    items.sort_by_key(|item| (item.level.rank(), item.id));
}

#[async_trait]
impl VocabularyStore for MemoryStore {
    async fn insert_items(&self, items: Vec<NewVocabularyItem>) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut table = self.items.write();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            table.next_id += 1;
            let row = VocabularyItem {
                id: table.next_id,
                word: item.word,
                reading: item.reading,
                gloss: item.gloss,
                alternate_meanings: item.alternate_meanings,
                part_of_speech: item.part_of_speech,
                example: item.example,
                level: item.level,
                deck: item.deck,
            };
            table.rows.insert(row.id, row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn get_item(&self, id: i64) -> Result<Option<VocabularyItem>, StoreError> {
        Ok(self.items.read().rows.get(&id).cloned())
    }

    async fn get_items(&self, ids: &[i64]) -> Result<Vec<VocabularyItem>, StoreError> {
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        let table = self.items.read();
        Ok(wanted
            .into_iter()
            .filter_map(|id| table.rows.get(&id).cloned())
            .collect())
    }

    async fn list_items(&self, source: &LessonSource) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut items: Vec<VocabularyItem> = self
            .items
            .read()
            .rows
            .values()
            .filter(|item| source.matches(item))
            .cloned()
            .collect();
        level_then_id(&mut items);
        Ok(items)
    }

    async fn count_items(&self) -> Result<u64, StoreError> {
        Ok(self.items.read().rows.len() as u64)
    }

    async fn search_items(&self, query: &str, limit: usize) -> Result<Vec<VocabularyItem>, StoreError> {
        // ASCII-only folding, the same as SQLite's `lower()`.
        let needle = query.trim().to_ascii_lowercase();
        let mut items: Vec<VocabularyItem> = self
            .items
            .read()
            .rows
            .values()
            .filter(|item| {
                needle.is_empty()
                    || item.word.to_ascii_lowercase().contains(&needle)
                    || item.reading.to_ascii_lowercase().contains(&needle)
                    || item.gloss.to_ascii_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        level_then_id(&mut items);
        items.truncate(limit);
        Ok(items)
    }

    async fn list_decks(&self) -> Result<Vec<DeckSummary>, StoreError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for deck in self.items.read().rows.values().filter_map(|item| item.deck.as_ref()) {
            *counts.entry(deck.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(name, item_count)| DeckSummary { name, item_count })
            .collect())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_progress(&self, learner_id: &str, item_id: i64) -> Result<Option<ProgressRecord>, StoreError> {
        Ok(self
            .progress
            .read()
            .get(&(learner_id.to_string(), item_id))
            .cloned())
    }

    async fn list_progress(&self, learner_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let mut records: Vec<ProgressRecord> = self
            .progress
            .read()
            .values()
            .filter(|record| record.learner_id == learner_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.item_id);
        Ok(records)
    }

    async fn list_due(&self, learner_id: &str, now: DateTime<Utc>) -> Result<Vec<ProgressRecord>, StoreError> {
        let mut records: Vec<ProgressRecord> = self
            .progress
            .read()
            .values()
            .filter(|record| record.learner_id == learner_id && record.is_due(now))
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.next_due_at, record.item_id));
        Ok(records)
    }

    async fn insert_if_absent(&self, record: &ProgressRecord) -> Result<bool, StoreError> {
        let mut progress = self.progress.write();
        let key = (record.learner_id.clone(), record.item_id);
        if progress.contains_key(&key) {
            return Ok(false);
        }
        progress.insert(key, record.clone());
        Ok(true)
    }

    async fn compare_and_swap(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let mut progress = self.progress.write();
        let key = (record.learner_id.clone(), record.item_id);
        let Some(stored) = progress.get_mut(&key) else {
            return Err(StoreError::NotFound(format!(
                "progress for item {} of learner {}",
                record.item_id, record.learner_id
            )));
        };
        if stored.version != record.version {
            return Err(StoreError::Conflict {
                learner_id: record.learner_id.clone(),
                item_id: record.item_id,
            });
        }
        let mut next = record.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_all(&self, learner_id: &str) -> Result<u64, StoreError> {
        let mut progress = self.progress.write();
        let before = progress.len();
        progress.retain(|(learner, _), _| learner != learner_id);
        let removed = (before - progress.len()) as u64;
        drop(progress);

        self.activity.write().remove(learner_id);
        Ok(removed)
    }

    async fn record_activity(&self, learner_id: &str, day: NaiveDate) -> Result<(), StoreError> {
        self.activity
            .write()
            .entry(learner_id.to_string())
            .or_default()
            .insert(day);
        Ok(())
    }

    async fn activity_days(&self, learner_id: &str) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(self
            .activity
            .read()
            .get(learner_id)
            .map(|days| days.iter().copied().collect())
            .unwrap_or_default())
    }
}
