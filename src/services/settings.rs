use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SrsConfig;
use crate::db::Stores;
use crate::services::error::validate_learner_id;
use crate::services::session::remaining_today;
use crate::services::SrsError;
use crate::srs::{learner_level, SrsStage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSettings {
    pub max_lessons_per_day: u32,
    pub lessons_remaining_today: u32,
    pub session_idle_timeout_secs: u64,
    pub max_quiz_items: usize,
    pub level: u32,
    pub words_learned: u64,
}

pub async fn learner_settings(
    stores: &Stores,
    config: SrsConfig,
    learner_id: &str,
    now: DateTime<Utc>,
) -> Result<LearnerSettings, SrsError> {
    validate_learner_id(learner_id)?;
    let records = stores.progress.list_progress(learner_id).await?;
    let mastered = records
        .iter()
        .filter(|record| record.stage == SrsStage::Mastered)
        .count() as u64;

    Ok(LearnerSettings {
        max_lessons_per_day: config.max_lessons_per_day,
        lessons_remaining_today: remaining_today(&records, config.max_lessons_per_day, now),
        session_idle_timeout_secs: config.session_idle_timeout.as_secs(),
        max_quiz_items: config.max_quiz_items,
        level: learner_level(mastered),
        words_learned: records.len() as u64,
    })
}
