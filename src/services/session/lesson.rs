use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::SessionOrchestrator;
use crate::db::models::{LessonSource, ProgressRecord, VocabularyItem};
use crate::services::error::validate_learner_id;
use crate::services::SrsError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCompletion {
    pub introduced: Vec<i64>,
    pub already_learned: Vec<i64>,
}

/// Lessons still allowed today under the daily cap.
pub(crate) fn remaining_today(records: &[ProgressRecord], max_per_day: u32, now: DateTime<Utc>) -> u32 {
    let today = now.date_naive();
    let introduced_today = records
        .iter()
        .filter(|record| record.introduced_at.date_naive() == today)
        .count();
    max_per_day.saturating_sub(u32::try_from(introduced_today).unwrap_or(u32::MAX))
}

impl SessionOrchestrator {
    /// Next unlearned items from `source`, ascending level then id. Stable for
    /// repeated calls until a lesson is completed.
    pub async fn lesson_batch(
        &self,
        learner_id: &str,
        source: &LessonSource,
        limit: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<VocabularyItem>, SrsError> {
        validate_learner_id(learner_id)?;

        let records = self.progress.list_progress(learner_id).await?;
        let learned: HashSet<i64> = records.iter().map(|record| record.item_id).collect();
        let remaining = remaining_today(&records, self.config.max_lessons_per_day, now);
        let cap = limit.unwrap_or(self.config.max_lessons_per_day).min(remaining) as usize;

        let candidates: Vec<VocabularyItem> = self
            .vocabulary
            .list_items(source)
            .await?
            .into_iter()
            .filter(|item| !learned.contains(&item.id))
            .collect();

        if candidates.is_empty() {
            return Err(SrsError::NoContent("No new words to learn from this source".to_string()));
        }
        if remaining == 0 {
            return Err(SrsError::NoContent("Daily lesson limit reached, come back tomorrow".to_string()));
        }

        Ok(candidates.into_iter().take(cap).collect())
    }

    /// Creates Stage1 records for the items. Items the learner already has are
    /// reported back untouched, so concurrent completions never double-introduce.
    pub async fn complete_lessons(
        &self,
        learner_id: &str,
        item_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<LessonCompletion, SrsError> {
        validate_learner_id(learner_id)?;
        if item_ids.is_empty() {
            return Err(SrsError::InvalidInput("itemIds must be a non-empty array".to_string()));
        }

        let ids: Vec<i64> = item_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let completion = self.introduce(learner_id, &ids, now).await?;
        tracing::info!(
            learner_id,
            introduced = completion.introduced.len(),
            skipped = completion.already_learned.len(),
            "lesson completed"
        );
        Ok(completion)
    }

    /// Inserts introduction records for known, sorted, deduplicated ids.
    pub(super) async fn introduce(
        &self,
        learner_id: &str,
        ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<LessonCompletion, SrsError> {
        let items = self.vocabulary.get_items(ids).await?;
        if items.len() != ids.len() {
            let known: HashSet<i64> = items.iter().map(|item| item.id).collect();
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !known.contains(*id))
                .map(|id| id.to_string())
                .collect();
            return Err(SrsError::NotFound(format!("vocabulary items {}", missing.join(", "))));
        }

        let mut completion = LessonCompletion {
            introduced: Vec::new(),
            already_learned: Vec::new(),
        };
        for item in &items {
            let record = ProgressRecord::introduced(learner_id, item.id, now);
            if self.progress.insert_if_absent(&record).await? {
                completion.introduced.push(item.id);
            } else {
                completion.already_learned.push(item.id);
            }
        }

        if !completion.introduced.is_empty() {
            self.mark_active(learner_id, now).await;
        }
        Ok(completion)
    }
}
