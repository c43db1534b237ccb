use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::registry::{QuizMode, SessionKind, SessionPhase, SessionProgress, SessionState};
use super::{Gate, SessionOrchestrator};
use crate::db::models::VocabularyItem;
use crate::services::error::{validate_answer, validate_learner_id};
use crate::services::SrsError;
use crate::srs::questions::random_seed;
use crate::srs::{evaluate, quiz_passed, quiz_questions, required_correct, Direction, Evaluation, Question, SrsStage};

fn default_mode() -> QuizMode {
    QuizMode::Adhoc
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub item_ids: Vec<i64>,
    #[serde(default = "default_mode")]
    pub mode: QuizMode,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub item_id: i64,
    pub direction: Direction,
    /// Written form for foreign→gloss, gloss for gloss→foreign.
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStart {
    pub session_id: Uuid,
    pub seed: u64,
    pub mode: QuizMode,
    pub attempt: u32,
    pub total: usize,
    pub required_correct: u32,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: u32,
    pub total: u32,
    pub required_correct: u32,
    pub passed: bool,
    pub introduced_item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswerOutcome {
    pub item_id: i64,
    pub direction: Direction,
    pub correct: bool,
    pub canonical_answer: String,
    /// Stage after the answer when an ad-hoc quiz touched an existing record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_stage: Option<SrsStage>,
    pub progress: SessionProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<QuizResult>,
}

fn prompt_for(item: &VocabularyItem, direction: Direction) -> String {
    match direction {
        Direction::ForeignToGloss => item.word.clone(),
        Direction::GlossToForeign => item.gloss.clone(),
    }
}

fn total_questions(state: &SessionState) -> u32 {
    u32::try_from(state.questions.len()).unwrap_or(u32::MAX)
}

impl SessionOrchestrator {
    pub async fn start_quiz(
        &self,
        learner_id: &str,
        request: &QuizRequest,
        now: DateTime<Utc>,
    ) -> Result<QuizStart, SrsError> {
        validate_learner_id(learner_id)?;
        let ids: Vec<i64> = request
            .item_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Err(SrsError::NoContent("No words selected for the quiz".to_string()));
        }
        if ids.len() > self.config.max_quiz_items {
            return Err(SrsError::InvalidInput(format!(
                "a quiz holds at most {} items",
                self.config.max_quiz_items
            )));
        }

        let items = self.items_by_id(&ids).await?;
        let seed = request.seed.unwrap_or_else(random_seed);
        let questions = quiz_questions(seed, &ids);
        let state = SessionState::new(learner_id, SessionKind::Quiz(request.mode), seed, ids, questions);
        let start = quiz_start(&state, request.mode, &items);

        self.sessions.insert(state, now);
        tracing::debug!(learner_id, session_id = %start.session_id, total = start.total, "quiz started");
        Ok(start)
    }

    /// Answers the session's current question. Completing the last question
    /// scores the attempt; a passed lesson-mode quiz introduces its items.
    pub async fn answer_quiz(
        &self,
        learner_id: &str,
        session_id: Uuid,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<QuizAnswerOutcome, SrsError> {
        validate_learner_id(learner_id)?;
        validate_answer(answer)?;

        let handle = self.sessions.get(session_id, learner_id, now)?;
        let mut state = handle.lock().await;
        let SessionKind::Quiz(mode) = state.kind else {
            return Err(SrsError::InvalidInput(format!("session {session_id} is not a quiz")));
        };
        let question = state
            .current()
            .ok_or_else(|| SrsError::InvalidInput(format!("quiz {session_id} is already completed")))?;

        let item = self.load_item(question.item_id).await?;
        let evaluation = evaluate(&item, question.direction, answer);

        let mut new_stage = None;
        if mode == QuizMode::Adhoc {
            let existing = self.progress.get_progress(learner_id, item.id).await?;
            if existing.is_some_and(|record| !record.stage.is_terminal()) {
                let saved = self
                    .apply_outcome(learner_id, item.id, question.direction, evaluation.correct, Gate::Learned, now)
                    .await?;
                self.mark_active(learner_id, now).await;
                new_stage = Some(saved.stage);
            }
        }

        state.record(evaluation.correct);

        let mut result = None;
        if state.phase == SessionPhase::Completed {
            result = Some(self.finish_quiz(&mut state, mode, now).await?);
        }

        Ok(QuizAnswerOutcome {
            item_id: question.item_id,
            direction: question.direction,
            correct: evaluation.correct,
            canonical_answer: evaluation.canonical_answer,
            new_stage,
            progress: state.progress(),
            result,
        })
    }

    /// Restarts a quiz that has not been passed. The question order is the
    /// original one; answers of earlier attempts stay as they were applied.
    pub async fn retry_quiz(&self, learner_id: &str, session_id: Uuid, now: DateTime<Utc>) -> Result<QuizStart, SrsError> {
        validate_learner_id(learner_id)?;

        let handle = self.sessions.get(session_id, learner_id, now)?;
        let mut state = handle.lock().await;
        let SessionKind::Quiz(mode) = state.kind else {
            return Err(SrsError::InvalidInput(format!("session {session_id} is not a quiz")));
        };
        if state.passed == Some(true) {
            return Err(SrsError::InvalidInput(format!("quiz {session_id} was already passed")));
        }

        let items = self.items_by_id(&state.item_ids).await?;
        state.restart();
        tracing::debug!(learner_id, %session_id, attempt = state.attempt, "quiz retried");
        Ok(quiz_start(&state, mode, &items))
    }

    /// Stateless check of one answer, no persistence.
    pub async fn quiz_check(&self, item_id: i64, direction: Direction, answer: &str) -> Result<Evaluation, SrsError> {
        validate_answer(answer)?;
        let item = self.load_item(item_id).await?;
        Ok(evaluate(&item, direction, answer))
    }

    async fn finish_quiz(
        &self,
        state: &mut SessionState,
        mode: QuizMode,
        now: DateTime<Utc>,
    ) -> Result<QuizResult, SrsError> {
        let total = total_questions(state);
        let passed = quiz_passed(state.score, total);

        // The pass only sticks once its records exist, so a failed write stays retryable.
        let mut introduced_item_ids = Vec::new();
        if passed && mode == QuizMode::Lesson {
            let ids = state.item_ids.clone();
            introduced_item_ids = self.introduce(&state.learner_id, &ids, now).await?.introduced;
        }
        state.passed = Some(passed);

        tracing::info!(
            learner_id = %state.learner_id,
            session_id = %state.id,
            score = state.score,
            total,
            passed,
            "quiz attempt finished"
        );

        Ok(QuizResult {
            score: state.score,
            total,
            required_correct: required_correct(total),
            passed,
            introduced_item_ids,
        })
    }

    async fn items_by_id(&self, ids: &[i64]) -> Result<HashMap<i64, VocabularyItem>, SrsError> {
        let items: HashMap<i64, VocabularyItem> = self
            .vocabulary
            .get_items(ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        if let Some(missing) = ids.iter().find(|id| !items.contains_key(*id)) {
            return Err(SrsError::NotFound(format!("vocabulary item {missing}")));
        }
        Ok(items)
    }
}

fn quiz_start(state: &SessionState, mode: QuizMode, items: &HashMap<i64, VocabularyItem>) -> QuizStart {
    let questions = state
        .questions
        .iter()
        .filter_map(|question: &Question| {
            let item = items.get(&question.item_id)?;
            Some(QuizQuestion {
                item_id: question.item_id,
                direction: question.direction,
                prompt: prompt_for(item, question.direction),
            })
        })
        .collect();

    QuizStart {
        session_id: state.id,
        seed: state.seed,
        mode,
        attempt: state.attempt,
        total: state.questions.len(),
        required_correct: required_correct(total_questions(state)),
        questions,
    }
}
