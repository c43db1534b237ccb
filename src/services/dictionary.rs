use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{DeckSummary, Tally, VocabularyItem};
use crate::db::Stores;
use crate::services::dashboard::Accuracy;
use crate::services::error::validate_learner_id;
use crate::services::SrsError;
use crate::srs::SrsStage;

pub const MAX_SEARCH_RESULTS: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDetail {
    pub item: VocabularyItem,
    pub learned: bool,
    pub stage: SrsStage,
    pub stage_label: &'static str,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub introduced_at: Option<DateTime<Utc>>,
    pub accuracy: Accuracy,
}

/// Substring search over written form, reading and gloss. Mastered items are
/// included; an empty query lists the first items by level.
pub async fn search(stores: &Stores, query: &str) -> Result<Vec<VocabularyItem>, SrsError> {
    let items = stores
        .vocabulary
        .search_items(query, MAX_SEARCH_RESULTS)
        .await?;
    Ok(items)
}

/// Custom decks usable as a lesson source. No decks is an empty list.
pub async fn decks(stores: &Stores) -> Result<Vec<DeckSummary>, SrsError> {
    Ok(stores.vocabulary.list_decks().await?)
}

pub async fn word_detail(stores: &Stores, learner_id: &str, item_id: i64) -> Result<WordDetail, SrsError> {
    validate_learner_id(learner_id)?;
    let item = stores
        .vocabulary
        .get_item(item_id)
        .await?
        .ok_or_else(|| SrsError::NotFound(format!("vocabulary item {item_id}")))?;
    let record = stores.progress.get_progress(learner_id, item_id).await?;

    let stage = record.as_ref().map_or(SrsStage::New, |record| record.stage);
    let tally = record.as_ref().map_or(Tally::default(), |record| Tally {
        correct: record.total_correct,
        attempts: record.total_attempts,
    });

    Ok(WordDetail {
        item,
        learned: record.is_some(),
        stage,
        stage_label: stage.label(),
        last_reviewed_at: record.as_ref().and_then(|record| record.last_reviewed_at),
        next_due_at: record.as_ref().and_then(|record| record.next_due_at),
        introduced_at: record.as_ref().map(|record| record.introduced_at),
        accuracy: tally.into(),
    })
}
