use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

mod common;

use common::{correct_answer, custom_item, t0, Harness};
use kotoba_backend::config::SrsConfig;
use kotoba_backend::db::memory::MemoryStore;
use kotoba_backend::db::models::{LessonSource, ProgressRecord};
use kotoba_backend::db::{ProgressStore, StoreError, Stores, VocabularyStore};
use kotoba_backend::seed::seed_vocabulary;
use kotoba_backend::services::session::{QuizMode, QuizRequest, ReviewAnswer, SessionPhase};
use kotoba_backend::services::SrsError;
use kotoba_backend::srs::{Direction, SrsStage};

const LEARNER: &str = "alice";

fn answer(item_id: i64, direction: Direction, text: &str) -> ReviewAnswer {
    ReviewAnswer {
        item_id,
        direction,
        answer: text.to_string(),
        session_id: None,
    }
}

#[tokio::test]
async fn test_cat_lesson_review_cycle() {
    let h = Harness::seeded().await;
    let start = t0();

    let completion = h
        .orchestrator
        .complete_lessons(LEARNER, &[1], start)
        .await
        .unwrap();
    assert_eq!(completion.introduced, vec![1]);

    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.stage, SrsStage::Stage1);
    assert_eq!(record.next_due_at, Some(start + Duration::hours(4)));
    assert_eq!(record.total_attempts, 0);

    // Not due before the interval elapses.
    let early = h.orchestrator.review_batch(LEARNER, Some(1), start + Duration::hours(3)).await;
    assert!(matches!(early, Err(SrsError::NoContent(_))));

    let first = start + Duration::hours(4) + Duration::minutes(1);
    let outcome = h
        .orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, " Cat"), first)
        .await
        .unwrap();
    assert!(outcome.correct);
    assert_eq!(outcome.new_stage, SrsStage::Stage2);
    assert_eq!(outcome.next_due_at, Some(first + Duration::hours(8)));

    let second = first + Duration::hours(8);
    let outcome = h
        .orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::GlossToForeign, "いぬ"), second)
        .await
        .unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.canonical_answer, "猫");
    assert_eq!(outcome.new_stage, SrsStage::Stage1);
    assert_eq!(outcome.next_due_at, Some(second + Duration::hours(4)));

    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.total_attempts, 2);
    assert_eq!(record.total_correct, 1);
    assert_eq!(record.consecutive_correct, 0);
    assert_eq!(record.foreign_to_gloss.correct, 1);
    assert_eq!(record.gloss_to_foreign.attempts, 1);
    assert_eq!(record.last_reviewed_at, Some(second));
}

#[tokio::test]
async fn test_review_of_unlearned_item_is_not_found() {
    let h = Harness::seeded().await;
    let result = h
        .orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), t0())
        .await;
    assert!(matches!(result, Err(SrsError::NotFound(_))));
}

#[tokio::test]
async fn test_lesson_batch_is_deterministic() {
    let h = Harness::seeded().await;
    let first = h
        .orchestrator
        .lesson_batch(LEARNER, &LessonSource::All, None, t0())
        .await
        .unwrap();
    let second = h
        .orchestrator
        .lesson_batch(LEARNER, &LessonSource::All, None, t0() + Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(first.len(), 15);
    assert_eq!(first[0].word, "猫");
    let ids: Vec<i64> = first.iter().map(|item| item.id).collect();
    assert_eq!(ids, second.iter().map(|item| item.id).collect::<Vec<_>>());
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_daily_lesson_cap_resets_next_day() {
    let h = Harness::seeded().await;
    let batch = h
        .orchestrator
        .lesson_batch(LEARNER, &LessonSource::All, None, t0())
        .await
        .unwrap();
    let ids: Vec<i64> = batch.iter().map(|item| item.id).collect();
    h.orchestrator.complete_lessons(LEARNER, &ids, t0()).await.unwrap();

    let capped = h
        .orchestrator
        .lesson_batch(LEARNER, &LessonSource::All, None, t0() + Duration::hours(2))
        .await;
    assert!(matches!(capped, Err(SrsError::NoContent(_))));

    let tomorrow = h
        .orchestrator
        .lesson_batch(LEARNER, &LessonSource::All, None, t0() + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(tomorrow.len(), 15);
    assert!(tomorrow.iter().all(|item| !ids.contains(&item.id)));
}

#[tokio::test]
async fn test_explicit_limit_is_capped_by_remaining() {
    let config = SrsConfig {
        max_lessons_per_day: 3,
        ..SrsConfig::default()
    };
    let stores = Stores::in_memory();
    seed_vocabulary(stores.vocabulary.as_ref()).await.unwrap();
    let h = Harness::with_config(stores, config);

    let batch = h
        .orchestrator
        .lesson_batch(LEARNER, &LessonSource::All, Some(10), t0())
        .await
        .unwrap();
    assert_eq!(batch.len(), 3);
}

#[tokio::test]
async fn test_reset_clears_dashboard() {
    let h = Harness::seeded().await;
    let inserted = h
        .stores
        .vocabulary
        .insert_items((0..50).map(custom_item).collect())
        .await
        .unwrap();
    let ids: Vec<i64> = inserted.iter().map(|item| item.id).collect();
    h.orchestrator.complete_lessons(LEARNER, &ids, t0()).await.unwrap();
    h.orchestrator.complete_lessons("bob", &ids[..2], t0()).await.unwrap();

    let before = h.dashboard.summary(LEARNER, t0() + Duration::hours(5)).await.unwrap();
    assert_eq!(before.words_learned, 50);
    assert_eq!(before.reviews_due, 50);

    let removed = h.orchestrator.reset_all(LEARNER).await.unwrap();
    assert_eq!(removed, 50);

    let after = h.dashboard.summary(LEARNER, t0() + Duration::hours(5)).await.unwrap();
    assert_eq!(after.words_learned, 0);
    assert_eq!(after.words_mastered, 0);
    assert_eq!(after.reviews_due, 0);
    assert_eq!(after.daily_streak, 0);
    assert_eq!(after.level, 1);
    assert!(after.next_review_at.is_none());
    assert!(after.stage_counts.values().all(|count| *count == 0));

    let bob = h.dashboard.summary("bob", t0()).await.unwrap();
    assert_eq!(bob.words_learned, 2);
}

#[tokio::test]
async fn test_lesson_quiz_fail_retry_pass() {
    let h = Harness::seeded().await;
    let request = QuizRequest {
        item_ids: vec![1, 2, 3, 4, 5],
        mode: QuizMode::Lesson,
        seed: Some(77),
    };
    let start = h.orchestrator.start_quiz(LEARNER, &request, t0()).await.unwrap();
    assert_eq!(start.total, 10);
    assert_eq!(start.required_correct, 8);

    let mut last = None;
    for (index, question) in start.questions.iter().enumerate() {
        let item = h.item(question.item_id).await;
        let text = if index < 7 {
            correct_answer(&item, question.direction)
        } else {
            "zzz".to_string()
        };
        last = Some(
            h.orchestrator
                .answer_quiz(LEARNER, start.session_id, &text, t0())
                .await
                .unwrap(),
        );
    }
    let result = last.unwrap().result.unwrap();
    assert_eq!(result.score, 7);
    assert!(!result.passed);
    assert!(result.introduced_item_ids.is_empty());
    assert!(h.stores.progress.list_progress(LEARNER).await.unwrap().is_empty());

    let retry = h
        .orchestrator
        .retry_quiz(LEARNER, start.session_id, t0())
        .await
        .unwrap();
    assert_eq!(retry.attempt, 2);
    let order: Vec<_> = retry.questions.iter().map(|q| (q.item_id, q.direction)).collect();
    let original: Vec<_> = start.questions.iter().map(|q| (q.item_id, q.direction)).collect();
    assert_eq!(order, original);

    let mut last = None;
    for question in &retry.questions {
        let item = h.item(question.item_id).await;
        last = Some(
            h.orchestrator
                .answer_quiz(LEARNER, start.session_id, &correct_answer(&item, question.direction), t0())
                .await
                .unwrap(),
        );
    }
    let outcome = last.unwrap();
    assert_eq!(outcome.progress.phase, SessionPhase::Completed);
    let result = outcome.result.unwrap();
    assert!(result.passed);
    assert_eq!(result.introduced_item_ids, vec![1, 2, 3, 4, 5]);

    let records = h.stores.progress.list_progress(LEARNER).await.unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|record| record.stage == SrsStage::Stage1));

    let again = h.orchestrator.retry_quiz(LEARNER, start.session_id, t0()).await;
    assert!(matches!(again, Err(SrsError::InvalidInput(_))));
}

#[tokio::test]
async fn test_adhoc_quiz_advances_existing_record() {
    let h = Harness::seeded().await;
    h.orchestrator.complete_lessons(LEARNER, &[1], t0()).await.unwrap();

    let request = QuizRequest {
        item_ids: vec![1, 2],
        mode: QuizMode::Adhoc,
        seed: Some(5),
    };
    let at = t0() + Duration::hours(1);
    let start = h.orchestrator.start_quiz(LEARNER, &request, at).await.unwrap();

    let mut stages = Vec::new();
    for question in &start.questions {
        let item = h.item(question.item_id).await;
        let outcome = h
            .orchestrator
            .answer_quiz(LEARNER, start.session_id, &correct_answer(&item, question.direction), at)
            .await
            .unwrap();
        if question.item_id == 2 {
            assert!(outcome.new_stage.is_none());
        } else {
            stages.push(outcome.new_stage.unwrap());
        }
    }
    assert_eq!(stages, vec![SrsStage::Stage2, SrsStage::Stage3]);

    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.stage, SrsStage::Stage3);
    assert!(h.stores.progress.get_progress(LEARNER, 2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_quiz_limits() {
    let config = SrsConfig {
        max_quiz_items: 2,
        ..SrsConfig::default()
    };
    let stores = Stores::in_memory();
    seed_vocabulary(stores.vocabulary.as_ref()).await.unwrap();
    let h = Harness::with_config(stores, config);

    let too_many = QuizRequest {
        item_ids: vec![1, 2, 3],
        mode: QuizMode::Adhoc,
        seed: None,
    };
    let result = h.orchestrator.start_quiz(LEARNER, &too_many, t0()).await;
    assert!(matches!(result, Err(SrsError::InvalidInput(_))));

    let unknown = QuizRequest {
        item_ids: vec![1, 9999],
        mode: QuizMode::Adhoc,
        seed: None,
    };
    let result = h.orchestrator.start_quiz(LEARNER, &unknown, t0()).await;
    assert!(matches!(result, Err(SrsError::NotFound(_))));
}

#[tokio::test]
async fn test_review_session_rejects_out_of_order_answer() {
    let h = Harness::seeded().await;
    h.orchestrator.complete_lessons(LEARNER, &[1, 2, 3], t0()).await.unwrap();
    let at = t0() + Duration::hours(5);

    let batch = h.orchestrator.review_batch(LEARNER, Some(3), at).await.unwrap();
    assert_eq!(batch.questions.len(), 3);
    let current = &batch.questions[0];
    let flipped = match current.direction {
        Direction::ForeignToGloss => Direction::GlossToForeign,
        Direction::GlossToForeign => Direction::ForeignToGloss,
    };

    let mut wrong = answer(current.item.id, flipped, "whatever");
    wrong.session_id = Some(batch.session_id);
    let result = h.orchestrator.submit_answer(LEARNER, &wrong, at).await;
    assert!(matches!(result, Err(SrsError::InvalidInput(_))));

    let mut right = answer(
        current.item.id,
        current.direction,
        &correct_answer(&current.item, current.direction),
    );
    right.session_id = Some(batch.session_id);
    let outcome = h.orchestrator.submit_answer(LEARNER, &right, at).await.unwrap();
    assert!(outcome.correct);
    let progress = outcome.session.unwrap();
    assert_eq!(progress.position, 1);
    assert_eq!(progress.score, 1);
}

#[tokio::test]
async fn test_review_batch_order_follows_seed() {
    let h = Harness::seeded().await;
    let ids: Vec<i64> = (1..=10).collect();
    h.orchestrator.complete_lessons(LEARNER, &ids, t0()).await.unwrap();
    let at = t0() + Duration::hours(5);

    let first = h.orchestrator.review_batch(LEARNER, Some(99), at).await.unwrap();
    let second = h.orchestrator.review_batch(LEARNER, Some(99), at).await.unwrap();
    let order = |batch: &kotoba_backend::services::session::ReviewBatch| {
        batch
            .questions
            .iter()
            .map(|q| (q.item.id, q.direction))
            .collect::<Vec<_>>()
    };

    assert_eq!(order(&first), order(&second));
    assert_ne!(first.session_id, second.session_id);
    assert!(first.questions.iter().all(|q| q.srs_stage == SrsStage::Stage1));
}

#[tokio::test]
async fn test_session_of_other_learner_is_hidden() {
    let h = Harness::seeded().await;
    let request = QuizRequest {
        item_ids: vec![1],
        mode: QuizMode::Adhoc,
        seed: Some(1),
    };
    let start = h.orchestrator.start_quiz(LEARNER, &request, t0()).await.unwrap();
    let result = h.orchestrator.answer_quiz("mallory", start.session_id, "cat", t0()).await;
    assert!(matches!(result, Err(SrsError::NotFound(_))));
}

#[tokio::test]
async fn test_idle_session_expires() {
    let h = Harness::seeded().await;
    let request = QuizRequest {
        item_ids: vec![1],
        mode: QuizMode::Adhoc,
        seed: Some(1),
    };
    let start = h.orchestrator.start_quiz(LEARNER, &request, t0()).await.unwrap();
    let later = t0() + Duration::minutes(31);

    assert_eq!(h.orchestrator.evict_idle_sessions(later), 1);
    let result = h.orchestrator.answer_quiz(LEARNER, start.session_id, "cat", later).await;
    assert!(matches!(result, Err(SrsError::NotFound(_))));
}

/// How many calls of each kind fail before the store behaves.
#[derive(Default)]
struct Failures {
    conflicts: usize,
    inserts: usize,
    activity: usize,
}

/// Memory-backed progress store. Failed compare-and-swaps report a lost race;
/// failed inserts and activity writes report the store as unavailable.
struct FlakyStore {
    inner: Arc<MemoryStore>,
    conflicts: AtomicUsize,
    inserts: AtomicUsize,
    activity: AtomicUsize,
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn get_progress(&self, learner_id: &str, item_id: i64) -> Result<Option<ProgressRecord>, StoreError> {
        self.inner.get_progress(learner_id, item_id).await
    }

    async fn list_progress(&self, learner_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        self.inner.list_progress(learner_id).await
    }

    async fn list_due(&self, learner_id: &str, now: DateTime<Utc>) -> Result<Vec<ProgressRecord>, StoreError> {
        self.inner.list_due(learner_id, now).await
    }

    async fn insert_if_absent(&self, record: &ProgressRecord) -> Result<bool, StoreError> {
        if take_one(&self.inserts) {
            return Err(StoreError::Unavailable("down".to_string()));
        }
        self.inner.insert_if_absent(record).await
    }

    async fn compare_and_swap(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        if take_one(&self.conflicts) {
            return Err(StoreError::Conflict {
                learner_id: record.learner_id.clone(),
                item_id: record.item_id,
            });
        }
        self.inner.compare_and_swap(record).await
    }

    async fn delete_all(&self, learner_id: &str) -> Result<u64, StoreError> {
        self.inner.delete_all(learner_id).await
    }

    async fn record_activity(&self, learner_id: &str, day: NaiveDate) -> Result<(), StoreError> {
        if take_one(&self.activity) {
            return Err(StoreError::Unavailable("down".to_string()));
        }
        self.inner.record_activity(learner_id, day).await
    }

    async fn activity_days(&self, learner_id: &str) -> Result<Vec<NaiveDate>, StoreError> {
        self.inner.activity_days(learner_id).await
    }
}

async fn flaky_harness(failures: Failures) -> Harness {
    let memory = Arc::new(MemoryStore::new());
    seed_vocabulary(memory.as_ref()).await.unwrap();
    let vocabulary: Arc<dyn VocabularyStore> = memory.clone();
    let progress: Arc<dyn ProgressStore> = Arc::new(FlakyStore {
        inner: memory,
        conflicts: AtomicUsize::new(failures.conflicts),
        inserts: AtomicUsize::new(failures.inserts),
        activity: AtomicUsize::new(failures.activity),
    });
    Harness::new(Stores {
        vocabulary,
        progress,
        backend: "memory",
    })
}

#[tokio::test]
async fn test_single_lost_race_is_retried() {
    let h = flaky_harness(Failures {
        conflicts: 1,
        ..Failures::default()
    })
    .await;
    h.orchestrator.complete_lessons(LEARNER, &[1], t0()).await.unwrap();

    let outcome = h
        .orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), t0() + Duration::hours(5))
        .await
        .unwrap();
    assert_eq!(outcome.new_stage, SrsStage::Stage2);
}

#[tokio::test]
async fn test_repeated_lost_race_surfaces_conflict() {
    let h = flaky_harness(Failures {
        conflicts: 2,
        ..Failures::default()
    })
    .await;
    h.orchestrator.complete_lessons(LEARNER, &[1], t0()).await.unwrap();

    let result = h
        .orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), t0() + Duration::hours(5))
        .await;
    assert!(matches!(result, Err(SrsError::Conflict(_))));

    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.stage, SrsStage::Stage1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lesson_completion_introduces_once() {
    let h = Harness::seeded().await;
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let orchestrator = h.orchestrator.clone();
        tasks.push(tokio::spawn(async move {
            orchestrator.complete_lessons(LEARNER, &[1, 2, 3], t0()).await
        }));
    }

    let mut introduced = 0;
    for task in tasks {
        introduced += task.await.unwrap().unwrap().introduced.len();
    }
    assert_eq!(introduced, 3);
    assert_eq!(h.stores.progress.list_progress(LEARNER).await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reviews_move_a_due_record_once() {
    let h = Harness::seeded().await;
    h.orchestrator.complete_lessons(LEARNER, &[1], t0()).await.unwrap();
    let at = t0() + Duration::hours(5);

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let orchestrator = h.orchestrator.clone();
        tasks.push(tokio::spawn(async move {
            orchestrator
                .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), at)
                .await
        }));
    }
    let mut applied = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(outcome) => {
                assert_eq!(outcome.new_stage, SrsStage::Stage2);
                applied += 1;
            }
            Err(err) => assert!(matches!(err, SrsError::InvalidInput(_)), "unexpected {err:?}"),
        }
    }
    assert_eq!(applied, 1);

    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.total_attempts, 1);
    assert_eq!(record.stage, SrsStage::Stage2);
}

#[tokio::test]
async fn test_answer_before_due_time_is_rejected() {
    let h = Harness::seeded().await;
    h.orchestrator.complete_lessons(LEARNER, &[1], t0()).await.unwrap();
    let soon = t0() + Duration::minutes(1);

    for _ in 0..4 {
        let result = h
            .orchestrator
            .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), soon)
            .await;
        assert!(matches!(result, Err(SrsError::InvalidInput(_))));
    }
    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.stage, SrsStage::Stage1);
    assert_eq!(record.total_attempts, 0);

    // Once answered, the record waits out the next interval again.
    let due = t0() + Duration::hours(4);
    h.orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), due)
        .await
        .unwrap();
    let again = h
        .orchestrator
        .submit_answer(LEARNER, &answer(1, Direction::ForeignToGloss, "cat"), due + Duration::hours(1))
        .await;
    assert!(matches!(again, Err(SrsError::InvalidInput(_))));
    let record = h.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.stage, SrsStage::Stage2);
}

#[tokio::test]
async fn test_failed_introduction_keeps_lesson_quiz_retryable() {
    let h = flaky_harness(Failures {
        inserts: 1,
        ..Failures::default()
    })
    .await;
    let request = QuizRequest {
        item_ids: vec![1, 2],
        mode: QuizMode::Lesson,
        seed: Some(8),
    };
    let start = h.orchestrator.start_quiz(LEARNER, &request, t0()).await.unwrap();

    let mut last = None;
    for question in &start.questions {
        let item = h.item(question.item_id).await;
        last = Some(
            h.orchestrator
                .answer_quiz(LEARNER, start.session_id, &correct_answer(&item, question.direction), t0())
                .await,
        );
    }
    assert!(matches!(last.unwrap(), Err(SrsError::Unavailable(_))));
    assert!(h.stores.progress.list_progress(LEARNER).await.unwrap().is_empty());

    let retry = h
        .orchestrator
        .retry_quiz(LEARNER, start.session_id, t0())
        .await
        .unwrap();
    let mut last = None;
    for question in &retry.questions {
        let item = h.item(question.item_id).await;
        last = Some(
            h.orchestrator
                .answer_quiz(LEARNER, start.session_id, &correct_answer(&item, question.direction), t0())
                .await
                .unwrap(),
        );
    }
    let result = last.unwrap().result.unwrap();
    assert!(result.passed);
    assert_eq!(result.introduced_item_ids, vec![1, 2]);
    assert_eq!(h.stores.progress.list_progress(LEARNER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_activity_failure_does_not_undo_a_saved_answer() {
    // The lesson and the review each lose their activity write.
    let flaky = flaky_harness(Failures {
        activity: 2,
        ..Failures::default()
    })
    .await;
    let completion = flaky.orchestrator.complete_lessons(LEARNER, &[1], t0()).await.unwrap();
    assert_eq!(completion.introduced, vec![1]);
    let at = t0() + Duration::hours(5);

    let batch = flaky.orchestrator.review_batch(LEARNER, Some(4), at).await.unwrap();
    let question = &batch.questions[0];
    let mut reply = answer(
        question.item.id,
        question.direction,
        &correct_answer(&question.item, question.direction),
    );
    reply.session_id = Some(batch.session_id);

    let outcome = flaky.orchestrator.submit_answer(LEARNER, &reply, at).await.unwrap();
    assert_eq!(outcome.new_stage, SrsStage::Stage2);
    assert_eq!(outcome.session.unwrap().position, 1);

    // The same answer again is not applied twice.
    let repeat = flaky.orchestrator.submit_answer(LEARNER, &reply, at).await;
    assert!(matches!(repeat, Err(SrsError::InvalidInput(_))));
    let record = flaky.stores.progress.get_progress(LEARNER, 1).await.unwrap().unwrap();
    assert_eq!(record.stage, SrsStage::Stage2);
    assert!(flaky.stores.progress.activity_days(LEARNER).await.unwrap().is_empty());
}
