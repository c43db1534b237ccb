use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::services::SrsError;
use crate::srs::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Initializing,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Passing introduces the quizzed items into the review cycle.
    Lesson,
    Adhoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Review,
    Quiz(QuizMode),
}

/// Ephemeral state of one Review or Quiz session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub learner_id: String,
    pub kind: SessionKind,
    pub seed: u64,
    pub item_ids: Vec<i64>,
    pub questions: Vec<Question>,
    pub position: usize,
    pub score: u32,
    pub attempt: u32,
    pub phase: SessionPhase,
    pub passed: Option<bool>,
}

impl SessionState {
    pub fn new(learner_id: &str, kind: SessionKind, seed: u64, item_ids: Vec<i64>, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            learner_id: learner_id.to_string(),
            kind,
            seed,
            item_ids,
            questions,
            position: 0,
            score: 0,
            attempt: 1,
            phase: SessionPhase::Initializing,
            passed: None,
        }
    }

    pub fn current(&self) -> Option<Question> {
        match self.phase {
            SessionPhase::Completed => None,
            _ => self.questions.get(self.position).copied(),
        }
    }

    /// Moves past the current question and completes after the last one.
    pub fn record(&mut self, correct: bool) {
        self.phase = SessionPhase::InProgress;
        self.position += 1;
        if correct {
            self.score += 1;
        }
        if self.position >= self.questions.len() {
            self.phase = SessionPhase::Completed;
        }
    }

    pub fn restart(&mut self) {
        self.position = 0;
        self.score = 0;
        self.attempt += 1;
        self.phase = SessionPhase::InProgress;
        self.passed = None;
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            session_id: self.id,
            position: self.position,
            total: self.questions.len(),
            score: self.score,
            attempt: self.attempt,
            phase: self.phase,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub session_id: Uuid,
    pub position: usize,
    pub total: usize,
    pub score: u32,
    pub attempt: u32,
    pub phase: SessionPhase,
}

pub type SessionHandle = Arc<tokio::sync::Mutex<SessionState>>;

struct Entry {
    learner_id: String,
    last_touched: DateTime<Utc>,
    session: SessionHandle,
}

/// In-process session table with idle eviction.
///
/// The map lock is never held across an await; answering takes the per-session
/// async mutex so submissions for one session are applied in order.
pub struct SessionRegistry {
    idle_timeout: chrono::Duration,
    entries: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout: chrono::Duration::from_std(idle_timeout).unwrap_or(chrono::Duration::minutes(30)),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, mut state: SessionState, now: DateTime<Utc>) -> SessionHandle {
        state.phase = SessionPhase::InProgress;
        let id = state.id;
        let entry = Entry {
            learner_id: state.learner_id.clone(),
            last_touched: now,
            session: Arc::new(tokio::sync::Mutex::new(state)),
        };
        let handle = entry.session.clone();
        self.entries.lock().insert(id, entry);
        handle
    }

    /// Looks up a live session owned by `learner_id` and marks it as used.
    pub fn get(&self, id: Uuid, learner_id: &str, now: DateTime<Utc>) -> Result<SessionHandle, SrsError> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(&id) {
            Some(entry) if entry.learner_id == learner_id => now - entry.last_touched > self.idle_timeout,
            _ => return Err(SrsError::NotFound(format!("session {id}"))),
        };
        if expired {
            entries.remove(&id);
            return Err(SrsError::NotFound(format!("session {id} expired")));
        }
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| SrsError::NotFound(format!("session {id}")))?;
        entry.last_touched = now;
        Ok(entry.session.clone())
    }

    pub fn remove_learner(&self, learner_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.learner_id != learner_id);
        before - entries.len()
    }

    /// Drops sessions idle for longer than the timeout; returns how many went.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.last_touched <= self.idle_timeout);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
