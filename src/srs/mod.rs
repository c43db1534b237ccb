//! Pure spaced-repetition core: stage machine, answer judging, question ordering
//! and learner levels. Nothing in here touches storage or the clock.

pub mod evaluator;
pub mod level;
pub mod questions;
pub mod stage;

pub use evaluator::{evaluate, normalize_answer, Direction, Evaluation};
pub use level::{learner_level, level_bounds, LevelBounds};
pub use questions::{quiz_passed, quiz_questions, required_correct, review_questions, Question};
pub use stage::{advance, SrsStage, StageTransition};
