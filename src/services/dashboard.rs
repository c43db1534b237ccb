use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::SrsConfig;
use crate::db::models::{LessonSource, ProgressRecord, Tally};
use crate::db::{ProgressStore, Stores, VocabularyStore};
use crate::services::error::validate_learner_id;
use crate::services::session::remaining_today;
use crate::services::SrsError;
use crate::srs::{learner_level, level_bounds, Direction, LevelBounds, SrsStage};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accuracy {
    pub correct: u32,
    pub attempts: u32,
    /// `correct / attempts`, 0 when nothing was answered yet.
    pub ratio: f64,
}

impl From<Tally> for Accuracy {
    fn from(tally: Tally) -> Self {
        let ratio = if tally.attempts == 0 {
            0.0
        } else {
            f64::from(tally.correct) / f64::from(tally.attempts)
        };
        Self {
            correct: tally.correct,
            attempts: tally.attempts,
            ratio,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub level: u32,
    pub level_bounds: LevelBounds,
    pub words_learned: u64,
    pub words_mastered: u64,
    pub daily_streak: u32,
    pub reviews_due: u64,
    pub lessons_available: u64,
    pub stage_counts: BTreeMap<SrsStage, u64>,
    pub accuracy_by_source: BTreeMap<Direction, Accuracy>,
    pub next_review_at: Option<DateTime<Utc>>,
}

/// Read-only rollups over a learner's progress records.
pub struct DashboardAggregator {
    vocabulary: Arc<dyn VocabularyStore>,
    progress: Arc<dyn ProgressStore>,
    config: SrsConfig,
}

impl DashboardAggregator {
    pub fn new(stores: &Stores, config: SrsConfig) -> Self {
        Self {
            vocabulary: stores.vocabulary.clone(),
            progress: stores.progress.clone(),
            config,
        }
    }

    pub async fn summary(&self, learner_id: &str, now: DateTime<Utc>) -> Result<DashboardSummary, SrsError> {
        validate_learner_id(learner_id)?;

        let records = self.progress.list_progress(learner_id).await?;
        let days = self.progress.activity_days(learner_id).await?;
        let learned: HashSet<i64> = records.iter().map(|record| record.item_id).collect();
        let unlearned = self
            .vocabulary
            .list_items(&LessonSource::All)
            .await?
            .iter()
            .filter(|item| !learned.contains(&item.id))
            .count() as u64;

        Ok(summarize(
            &records,
            &days,
            unlearned,
            self.config.max_lessons_per_day,
            now,
        ))
    }
}

pub fn summarize(
    records: &[ProgressRecord],
    activity_days: &[NaiveDate],
    unlearned: u64,
    max_lessons_per_day: u32,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let mut stage_counts: BTreeMap<SrsStage, u64> = SrsStage::ALL.iter().map(|stage| (*stage, 0)).collect();
    let mut accuracy: BTreeMap<Direction, Tally> = Direction::ALL.iter().map(|d| (*d, Tally::default())).collect();

    for record in records {
        *stage_counts.entry(record.stage).or_default() += 1;
        for direction in Direction::ALL {
            let tally = record.tally(direction);
            let total = accuracy.entry(direction).or_default();
            total.correct += tally.correct;
            total.attempts += tally.attempts;
        }
    }

    let words_mastered = stage_counts.get(&SrsStage::Mastered).copied().unwrap_or(0);
    let level = learner_level(words_mastered);
    let remaining = u64::from(remaining_today(records, max_lessons_per_day, now));

    DashboardSummary {
        level,
        level_bounds: level_bounds(level),
        words_learned: records.len() as u64,
        words_mastered,
        daily_streak: daily_streak(activity_days, now.date_naive()),
        reviews_due: records.iter().filter(|record| record.is_due(now)).count() as u64,
        lessons_available: unlearned.min(remaining),
        stage_counts,
        accuracy_by_source: accuracy.into_iter().map(|(d, tally)| (d, tally.into())).collect(),
        next_review_at: records
            .iter()
            .filter(|record| !record.stage.is_terminal())
            .filter_map(|record| record.next_due_at)
            .min(),
    }
}

/// Consecutive active days ending today, or ending yesterday when the learner
/// has not been active yet today.
pub fn daily_streak(activity_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = activity_days.iter().copied().collect();
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}
