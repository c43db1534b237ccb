use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::{advance, Direction, SrsStage};

/// Fixed ordered level set; `Custom` sorts after every JLPT level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelTag {
    N5,
    N4,
    N3,
    N2,
    N1,
    #[serde(rename = "custom")]
    Custom,
}

impl LevelTag {
    pub fn rank(self) -> i64 {
        match self {
            Self::N5 => 0,
            Self::N4 => 1,
            Self::N3 => 2,
            Self::N2 => 3,
            Self::N1 => 4,
            Self::Custom => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::N5 => "N5",
            Self::N4 => "N4",
            Self::N3 => "N3",
            Self::N2 => "N2",
            Self::N1 => "N1",
            Self::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("JLPT_").unwrap_or(upper.as_str()) {
            "N5" => Some(Self::N5),
            "N4" => Some(Self::N4),
            "N3" => Some(Self::N3),
            "N2" => Some(Self::N2),
            "N1" => Some(Self::N1),
            "CUSTOM" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: i64,
    pub word: String,
    pub reading: String,
    pub gloss: String,
    #[serde(default)]
    pub alternate_meanings: Vec<String>,
    pub part_of_speech: String,
    pub example: Option<String>,
    pub level: LevelTag,
    pub deck: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVocabularyItem {
    pub word: String,
    pub reading: String,
    pub gloss: String,
    #[serde(default)]
    pub alternate_meanings: Vec<String>,
    pub part_of_speech: String,
    #[serde(default)]
    pub example: Option<String>,
    pub level: LevelTag,
    #[serde(default)]
    pub deck: Option<String>,
}

/// A named custom deck and how many items it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub name: String,
    pub item_count: u64,
}

/// Where lesson candidates are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonSource {
    All,
    Level(LevelTag),
    Deck(String),
}

impl LessonSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        match LevelTag::parse(trimmed) {
            Some(level) if level != LevelTag::Custom => Self::Level(level),
            _ => Self::Deck(trimmed.to_string()),
        }
    }

    pub fn matches(&self, item: &VocabularyItem) -> bool {
        match self {
            Self::All => true,
            Self::Level(level) => item.level == *level,
            Self::Deck(name) => item.deck.as_deref() == Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub correct: u32,
    pub attempts: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Per-learner, per-item SRS state. Exists only once the item was introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub learner_id: String,
    pub item_id: i64,
    pub stage: SrsStage,
    pub next_due_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub introduced_at: DateTime<Utc>,
    pub consecutive_correct: u32,
    pub total_correct: u32,
    pub total_attempts: u32,
    pub foreign_to_gloss: Tally,
    pub gloss_to_foreign: Tally,
    pub version: i64,
}

impl ProgressRecord {
    /// Record created by a completed lesson: one correct introduction, New → Stage1.
    ///
    /// The introduction only seeds `consecutive_correct`; answer tallies start at
    /// zero so accuracy reflects judged answers alone.
    pub fn introduced(learner_id: &str, item_id: i64, now: DateTime<Utc>) -> Self {
        let transition = advance(SrsStage::New, true, now);
        Self {
            learner_id: learner_id.to_string(),
            item_id,
            stage: transition.stage,
            next_due_at: transition.next_due_at,
            last_reviewed_at: Some(now),
            introduced_at: now,
            consecutive_correct: 1,
            total_correct: 0,
            total_attempts: 0,
            foreign_to_gloss: Tally::default(),
            gloss_to_foreign: Tally::default(),
            version: 0,
        }
    }

    pub fn tally(&self, direction: Direction) -> Tally {
        match direction {
            Direction::ForeignToGloss => self.foreign_to_gloss,
            Direction::GlossToForeign => self.gloss_to_foreign,
        }
    }

    pub fn record_answer(&mut self, direction: Direction, correct: bool) {
        match direction {
            Direction::ForeignToGloss => self.foreign_to_gloss.record(correct),
            Direction::GlossToForeign => self.gloss_to_foreign.record(correct),
        }
        self.total_attempts += 1;
        if correct {
            self.total_correct += 1;
            self.consecutive_correct += 1;
        } else {
            self.consecutive_correct = 0;
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.stage.is_terminal() && self.next_due_at.is_some_and(|due| due <= now)
    }
}
