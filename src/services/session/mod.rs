//! Lesson, Review and Quiz sessions over the vocabulary and progress stores.

mod lesson;
mod quiz;
pub mod registry;
mod review;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::SrsConfig;
use crate::db::models::{ProgressRecord, VocabularyItem};
use crate::db::{ProgressStore, StoreError, Stores, VocabularyStore};
use crate::services::error::validate_learner_id;
use crate::services::SrsError;
use crate::srs::{advance, Direction};

pub use lesson::LessonCompletion;
pub(crate) use lesson::remaining_today;
pub use quiz::{QuizAnswerOutcome, QuizQuestion, QuizRequest, QuizResult, QuizStart};
pub use registry::{QuizMode, SessionKind, SessionPhase, SessionProgress, SessionRegistry, SessionState};
pub use review::{AnswerOutcome, ReviewAnswer, ReviewBatch, ReviewQuestion};

pub struct SessionOrchestrator {
    vocabulary: Arc<dyn VocabularyStore>,
    progress: Arc<dyn ProgressStore>,
    sessions: SessionRegistry,
    config: SrsConfig,
}

impl SessionOrchestrator {
    pub fn new(stores: &Stores, config: SrsConfig) -> Self {
        Self {
            vocabulary: stores.vocabulary.clone(),
            progress: stores.progress.clone(),
            sessions: SessionRegistry::new(config.session_idle_timeout),
            config,
        }
    }

    pub fn config(&self) -> SrsConfig {
        self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn evict_idle_sessions(&self, now: DateTime<Utc>) -> usize {
        self.sessions.evict_idle(now)
    }

    /// Deletes every progress record, activity day and live session of the learner.
    pub async fn reset_all(&self, learner_id: &str) -> Result<u64, SrsError> {
        validate_learner_id(learner_id)?;
        let removed = self.progress.delete_all(learner_id).await?;
        let sessions = self.sessions.remove_learner(learner_id);
        tracing::info!(learner_id, removed, sessions, "learner progress reset");
        Ok(removed)
    }

    async fn load_item(&self, item_id: i64) -> Result<VocabularyItem, SrsError> {
        self.vocabulary
            .get_item(item_id)
            .await?
            .ok_or_else(|| SrsError::NotFound(format!("vocabulary item {item_id}")))
    }

    /// Read-modify-write of one record through compare-and-swap. A lost race is
    /// retried once against the fresh record before surfacing `Conflict`. With
    /// `Gate::Due` every fetched record, the re-fetched one included, must be due.
    async fn apply_outcome(
        &self,
        learner_id: &str,
        item_id: i64,
        direction: Direction,
        correct: bool,
        gate: Gate,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, SrsError> {
        let mut retried = false;
        loop {
            let current = self
                .progress
                .get_progress(learner_id, item_id)
                .await?
                .ok_or_else(|| SrsError::NotFound(format!("item {item_id} has not been learned yet")))?;
            if current.stage.is_terminal() {
                return Err(SrsError::InvalidInput(format!("item {item_id} is already mastered")));
            }
            if gate == Gate::Due && !current.is_due(now) {
                return Err(not_due(&current));
            }

            let next = reviewed(&current, direction, correct, now);
            match self.progress.compare_and_swap(&next).await {
                Ok(saved) => {
                    tracing::debug!(learner_id, item_id, stage = %saved.stage, correct, "progress updated");
                    return Ok(saved);
                }
                Err(StoreError::Conflict { .. }) if !retried => {
                    tracing::warn!(learner_id, item_id, "progress write lost a race, retrying");
                    retried = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Best effort: a persisted answer is never reported as failed because the
    /// streak day could not be written.
    async fn mark_active(&self, learner_id: &str, now: DateTime<Utc>) {
        if let Err(err) = self
            .progress
            .record_activity(learner_id, now.date_naive())
            .await
        {
            tracing::warn!(learner_id, error = %err, "failed to record activity day");
        }
    }
}

/// Which records an answer may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Reviews: only records whose next review time has passed.
    Due,
    /// Ad-hoc quizzes: any learned, non-mastered record.
    Learned,
}

fn not_due(record: &ProgressRecord) -> SrsError {
    let when = record
        .next_due_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    SrsError::InvalidInput(format!("item {} is not due for review until {when}", record.item_id))
}

fn reviewed(current: &ProgressRecord, direction: Direction, correct: bool, now: DateTime<Utc>) -> ProgressRecord {
    let transition = advance(current.stage, correct, now);
    let mut next = current.clone();
    next.stage = transition.stage;
    next.next_due_at = transition.next_due_at;
    next.last_reviewed_at = Some(now);
    next.record_answer(direction, correct);
    next
}
