use serde::{Deserialize, Serialize};

use crate::db::models::VocabularyItem;

/// Which way a question is posed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Show the written form, expect the gloss.
    #[serde(alias = "jp_to_en")]
    ForeignToGloss,
    /// Show the gloss, expect the written form or its reading.
    #[serde(alias = "en_to_jp")]
    GlossToForeign,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::ForeignToGloss, Direction::GlossToForeign];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForeignToGloss => "foreign_to_gloss",
            Self::GlossToForeign => "gloss_to_foreign",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foreign_to_gloss" | "jp_to_en" => Some(Self::ForeignToGloss),
            "gloss_to_foreign" | "en_to_jp" => Some(Self::GlossToForeign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub correct: bool,
    pub canonical_answer: String,
}

/// Trims, ASCII case-folds and collapses internal whitespace runs to one space.
pub fn normalize_answer(raw: &str) -> String {
    raw.split_whitespace()
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every meaning accepted for a foreign→gloss question, normalized.
///
/// The primary gloss is accepted verbatim and also split on `,`/`;` so each listed
/// meaning is individually acceptable. Alternate meanings stored on the item are
/// split the same way.
pub fn accepted_meanings(item: &VocabularyItem) -> Vec<String> {
    let mut out = Vec::new();
    push_unique(&mut out, normalize_answer(&item.gloss));

    let sources = std::iter::once(item.gloss.as_str()).chain(item.alternate_meanings.iter().map(String::as_str));
    for source in sources {
        for part in source.split(&[',', ';'][..]) {
            push_unique(&mut out, normalize_answer(part));
        }
    }
    out
}

/// Pure judgement of a free-text answer. Callers reject empty answers beforehand.
pub fn evaluate(item: &VocabularyItem, direction: Direction, raw_answer: &str) -> Evaluation {
    let answer = normalize_answer(raw_answer);

    match direction {
        Direction::ForeignToGloss => Evaluation {
            correct: !answer.is_empty() && accepted_meanings(item).iter().any(|m| *m == answer),
            canonical_answer: item.gloss.clone(),
        },
        Direction::GlossToForeign => {
            let correct = !answer.is_empty()
                && (answer == normalize_answer(&item.word) || answer == normalize_answer(&item.reading));
            Evaluation {
                correct,
                canonical_answer: item.word.clone(),
            }
        }
    }
}

fn push_unique(out: &mut Vec<String>, value: String) {
    if !value.is_empty() && !out.contains(&value) {
        out.push(value);
    }
}
