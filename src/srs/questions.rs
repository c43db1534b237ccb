use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::evaluator::Direction;

/// Quiz pass ratio expressed as a fraction (4/5 = 80%).
const PASS_NUMERATOR: u32 = 4;
const PASS_DENOMINATOR: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub item_id: i64,
    pub direction: Direction,
}

pub fn random_seed() -> u64 {
    rand::rng().random()
}

/// One question per due item, direction drawn per item, then shuffled.
///
/// Depends only on the seed and the id set, so the order can be rebuilt after a restart.
pub fn review_questions(seed: u64, item_ids: &[i64]) -> Vec<Question> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut questions: Vec<Question> = sorted_unique(item_ids)
        .into_iter()
        .map(|item_id| Question {
            item_id,
            direction: if rng.random_bool(0.5) {
                Direction::ForeignToGloss
            } else {
                Direction::GlossToForeign
            },
        })
        .collect();
    questions.shuffle(&mut rng);
    questions
}

/// Both directions for every item, shuffled once.
pub fn quiz_questions(seed: u64, item_ids: &[i64]) -> Vec<Question> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut questions: Vec<Question> = sorted_unique(item_ids)
        .into_iter()
        .flat_map(|item_id| {
            Direction::ALL
                .into_iter()
                .map(move |direction| Question { item_id, direction })
        })
        .collect();
    questions.shuffle(&mut rng);
    questions
}

/// `ceil(0.8 * total)` in integer arithmetic.
pub fn required_correct(total_questions: u32) -> u32 {
    (total_questions * PASS_NUMERATOR).div_ceil(PASS_DENOMINATOR)
}

pub fn quiz_passed(correct: u32, total_questions: u32) -> bool {
    correct >= required_correct(total_questions)
}

fn sorted_unique(item_ids: &[i64]) -> Vec<i64> {
    let mut ids = item_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
