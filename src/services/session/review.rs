use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::registry::{SessionKind, SessionProgress, SessionState};
use super::{Gate, SessionOrchestrator};
use crate::db::models::VocabularyItem;
use crate::services::error::{validate_answer, validate_learner_id};
use crate::services::SrsError;
use crate::srs::questions::random_seed;
use crate::srs::{evaluate, review_questions, Direction, SrsStage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuestion {
    pub item: VocabularyItem,
    pub srs_stage: SrsStage,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBatch {
    pub session_id: Uuid,
    pub seed: u64,
    pub questions: Vec<ReviewQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnswer {
    pub item_id: i64,
    pub direction: Direction,
    pub answer: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub canonical_answer: String,
    pub new_stage: SrsStage,
    pub next_due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionProgress>,
}

impl SessionOrchestrator {
    /// One question per due item. The order is rebuilt from `seed` alone, so a
    /// client holding the seed gets the same batch back.
    pub async fn review_batch(
        &self,
        learner_id: &str,
        seed: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<ReviewBatch, SrsError> {
        validate_learner_id(learner_id)?;

        let due = self.progress.list_due(learner_id, now).await?;
        if due.is_empty() {
            return Err(SrsError::NoContent("No reviews due right now".to_string()));
        }

        let stages: HashMap<i64, SrsStage> = due.iter().map(|record| (record.item_id, record.stage)).collect();
        let ids: Vec<i64> = due.iter().map(|record| record.item_id).collect();
        let items: HashMap<i64, VocabularyItem> = self
            .vocabulary
            .get_items(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let seed = seed.unwrap_or_else(random_seed);
        let questions: Vec<_> = review_questions(seed, &ids)
            .into_iter()
            .filter(|question| items.contains_key(&question.item_id))
            .collect();

        let payload = questions
            .iter()
            .filter_map(|question| {
                Some(ReviewQuestion {
                    item: items.get(&question.item_id)?.clone(),
                    srs_stage: *stages.get(&question.item_id)?,
                    direction: question.direction,
                })
            })
            .collect();

        let state = SessionState::new(learner_id, SessionKind::Review, seed, ids, questions);
        let session_id = state.id;
        self.sessions.insert(state, now);
        tracing::debug!(learner_id, %session_id, due = due.len(), "review session started");

        Ok(ReviewBatch {
            session_id,
            seed,
            questions: payload,
        })
    }

    /// Judges and persists one review answer immediately. Only due records move;
    /// with a session id the answer must be for the session's current question.
    pub async fn submit_answer(
        &self,
        learner_id: &str,
        answer: &ReviewAnswer,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SrsError> {
        validate_learner_id(learner_id)?;
        validate_answer(&answer.answer)?;

        let Some(session_id) = answer.session_id else {
            return self.apply_review(learner_id, answer, now).await;
        };

        let handle = self.sessions.get(session_id, learner_id, now)?;
        let mut state = handle.lock().await;
        if state.kind != SessionKind::Review {
            return Err(SrsError::InvalidInput(format!("session {session_id} is not a review session")));
        }
        let current = state
            .current()
            .ok_or_else(|| SrsError::InvalidInput(format!("session {session_id} is already completed")))?;
        if current.item_id != answer.item_id || current.direction != answer.direction {
            return Err(SrsError::InvalidInput(format!(
                "expected an answer for item {} ({})",
                current.item_id,
                current.direction.as_str()
            )));
        }

        let mut outcome = self.apply_review(learner_id, answer, now).await?;
        state.record(outcome.correct);
        outcome.session = Some(state.progress());
        Ok(outcome)
    }

    async fn apply_review(
        &self,
        learner_id: &str,
        answer: &ReviewAnswer,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SrsError> {
        let item = self.load_item(answer.item_id).await?;
        let evaluation = evaluate(&item, answer.direction, &answer.answer);
        let saved = self
            .apply_outcome(learner_id, item.id, answer.direction, evaluation.correct, Gate::Due, now)
            .await?;
        self.mark_active(learner_id, now).await;

        Ok(AnswerOutcome {
            correct: evaluation.correct,
            canonical_answer: evaluation.canonical_answer,
            new_stage: saved.stage,
            next_due_at: saved.next_due_at,
            session: None,
        })
    }
}
