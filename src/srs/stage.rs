use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Mastery stages in progression order. `Mastered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrsStage {
    New,
    Stage1,
    Stage2,
    Stage3,
    Stage4,
    Mastered,
}

impl SrsStage {
    pub const ALL: [SrsStage; 6] = [
        SrsStage::New,
        SrsStage::Stage1,
        SrsStage::Stage2,
        SrsStage::Stage3,
        SrsStage::Stage4,
        SrsStage::Mastered,
    ];

    pub fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Stage1 => 1,
            Self::Stage2 => 2,
            Self::Stage3 => 3,
            Self::Stage4 => 4,
            Self::Mastered => 5,
        }
    }

    pub fn successor(self) -> Self {
        match self {
            Self::New => Self::Stage1,
            Self::Stage1 => Self::Stage2,
            Self::Stage2 => Self::Stage3,
            Self::Stage3 => Self::Stage4,
            Self::Stage4 | Self::Mastered => Self::Mastered,
        }
    }

    /// One step back, floored at `Stage1`.
    pub fn predecessor(self) -> Self {
        match self {
            Self::New | Self::Stage1 | Self::Stage2 => Self::Stage1,
            Self::Stage3 => Self::Stage2,
            Self::Stage4 => Self::Stage3,
            Self::Mastered => Self::Stage4,
        }
    }

    /// Re-test interval after landing in this stage. `None` means no review is scheduled.
    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::New => None,
            Self::Stage1 => Some(Duration::hours(4)),
            Self::Stage2 => Some(Duration::hours(8)),
            Self::Stage3 => Some(Duration::days(1)),
            Self::Stage4 => Some(Duration::days(3)),
            Self::Mastered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Mastered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Stage1 => "stage1",
            Self::Stage2 => "stage2",
            Self::Stage3 => "stage3",
            Self::Stage4 => "stage4",
            Self::Mastered => "mastered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "stage1" | "child" => Some(Self::Stage1),
            "stage2" | "student" => Some(Self::Stage2),
            "stage3" | "scholar" => Some(Self::Stage3),
            "stage4" | "enlightened" => Some(Self::Stage4),
            "mastered" | "burned" => Some(Self::Mastered),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Stage1 => "Child",
            Self::Stage2 => "Student",
            Self::Stage3 => "Scholar",
            Self::Stage4 => "Enlightened",
            Self::Mastered => "Burned",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::New => "Not introduced yet",
            Self::Stage1 => "4 hours - Just learned",
            Self::Stage2 => "8 hours - Getting familiar",
            Self::Stage3 => "1 day - Well understood",
            Self::Stage4 => "3 days - Nearly mastered",
            Self::Mastered => "Mastered - No more reviews needed",
        }
    }
}

impl std::fmt::Display for SrsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransition {
    pub stage: SrsStage,
    pub next_due_at: Option<DateTime<Utc>>,
}

/// Exactly one stage move per outcome; streak length never fast-tracks.
pub fn advance(current: SrsStage, correct: bool, now: DateTime<Utc>) -> StageTransition {
    let stage = if correct {
        current.successor()
    } else {
        current.predecessor()
    };

    StageTransition {
        stage,
        next_due_at: stage.interval().map(|interval| now + interval),
    }
}
