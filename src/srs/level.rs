use serde::Serialize;

const LEVEL_THRESHOLDS: [u64; 6] = [0, 30, 60, 100, 150, 200];
const WORDS_PER_LEVEL_AFTER_TABLE: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBounds {
    pub current: u64,
    pub next: u64,
}

/// Learner level from the number of mastered words. Level 1 starts at zero.
pub fn learner_level(mastered_words: u64) -> u32 {
    let last = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
    if mastered_words >= last {
        let extra = (mastered_words - last) / WORDS_PER_LEVEL_AFTER_TABLE;
        return LEVEL_THRESHOLDS.len() as u32 + extra as u32;
    }
    LEVEL_THRESHOLDS
        .iter()
        .take_while(|&&threshold| mastered_words >= threshold)
        .count() as u32
}

pub fn level_bounds(level: u32) -> LevelBounds {
    LevelBounds {
        current: threshold_for(level.max(1)),
        next: threshold_for(level.max(1) + 1),
    }
}

fn threshold_for(level: u32) -> u64 {
    let idx = level as usize - 1;
    match LEVEL_THRESHOLDS.get(idx) {
        Some(threshold) => *threshold,
        None => {
            let last = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
            let beyond = (idx + 1 - LEVEL_THRESHOLDS.len()) as u64;
            last + beyond * WORDS_PER_LEVEL_AFTER_TABLE
        }
    }
}
