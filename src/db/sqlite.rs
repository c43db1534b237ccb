use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::db::config::{default_sqlite_path, DbConfig};
use crate::db::models::{DeckSummary, LessonSource, LevelTag, NewVocabularyItem, ProgressRecord, Tally, VocabularyItem};
use crate::db::sqlite_schema::{split_sql_statements, SCHEMA_VERSION, SQLITE_SCHEMA_SQL};
use crate::db::{DbInitError, ProgressStore, StoreError, VocabularyStore};
use crate::srs::SrsStage;

const ITEM_COLUMNS: &str = r#""id", "word", "reading", "gloss", "alternateMeanings", "partOfSpeech", "example", "level", "deck""#;

const PROGRESS_COLUMNS: &str = r#""learnerId", "itemId", "stage", "nextDueAt", "lastReviewedAt", "introducedAt",
    "consecutiveCorrect", "totalCorrect", "totalAttempts",
    "foreignToGlossCorrect", "foreignToGlossAttempts", "glossToForeignCorrect", "glossToForeignAttempts", "version""#;

const DAY_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating when missing) the database at `url` and applies the schema.
    /// `sqlite:default` resolves to the per-user data directory.
    pub async fn connect(url: &str, config: &DbConfig) -> Result<Self, DbInitError> {
        let url = if url == "sqlite:default" {
            let path = default_sqlite_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DbInitError::Io(e.to_string()))?;
            }
            format!("sqlite:{}?mode=rwc", path.display())
        } else {
            url.to_string()
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbInitError::Config(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        // Every connection to `:memory:` is a separate database.
        let max_connections = if url.contains(":memory:") {
            1
        } else {
            config.max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        run_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn run_schema(pool: &SqlitePool) -> Result<(), DbInitError> {
    let version: Option<String> =
        sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
            .fetch_optional(pool)
            .await
            .unwrap_or(None);

    if version.as_deref() == Some(SCHEMA_VERSION) {
        return Ok(());
    }

    for stmt in split_sql_statements(SQLITE_SCHEMA_SQL) {
        sqlx::query(&stmt).execute(pool).await?;
    }

    sqlx::query(r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?)"#)
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    tracing::info!(version = SCHEMA_VERSION, "sqlite schema applied");
    Ok(())
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| StoreError::Corrupt(format!("timestamp {ms}")))
}

fn optional_millis(ms: Option<i64>) -> Result<Option<DateTime<Utc>>, StoreError> {
    ms.map(from_millis).transpose()
}

fn count(row: &SqliteRow, column: &str) -> Result<u32, StoreError> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} = {value}")))
}

fn map_item(row: &SqliteRow) -> Result<VocabularyItem, StoreError> {
    let level: String = row.try_get("level")?;
    let alternate: String = row.try_get("alternateMeanings")?;
    Ok(VocabularyItem {
        id: row.try_get("id")?,
        word: row.try_get("word")?,
        reading: row.try_get("reading")?,
        gloss: row.try_get("gloss")?,
        alternate_meanings: serde_json::from_str(&alternate)
            .map_err(|e| StoreError::Corrupt(format!("alternateMeanings: {e}")))?,
        part_of_speech: row.try_get("partOfSpeech")?,
        example: row.try_get("example")?,
        level: LevelTag::parse(&level).ok_or_else(|| StoreError::Corrupt(format!("level {level}")))?,
        deck: row.try_get("deck")?,
    })
}

fn map_progress(row: &SqliteRow) -> Result<ProgressRecord, StoreError> {
    let stage: String = row.try_get("stage")?;
    Ok(ProgressRecord {
        learner_id: row.try_get("learnerId")?,
        item_id: row.try_get("itemId")?,
        stage: SrsStage::parse(&stage).ok_or_else(|| StoreError::Corrupt(format!("stage {stage}")))?,
        next_due_at: optional_millis(row.try_get("nextDueAt")?)?,
        last_reviewed_at: optional_millis(row.try_get("lastReviewedAt")?)?,
        introduced_at: from_millis(row.try_get("introducedAt")?)?,
        consecutive_correct: count(row, "consecutiveCorrect")?,
        total_correct: count(row, "totalCorrect")?,
        total_attempts: count(row, "totalAttempts")?,
        foreign_to_gloss: Tally {
            correct: count(row, "foreignToGlossCorrect")?,
            attempts: count(row, "foreignToGlossAttempts")?,
        },
        gloss_to_foreign: Tally {
            correct: count(row, "glossToForeignCorrect")?,
            attempts: count(row, "glossToForeignAttempts")?,
        },
        version: row.try_get("version")?,
    })
}

fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .to_ascii_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl VocabularyStore for SqliteStore {
    async fn insert_items(&self, items: Vec<NewVocabularyItem>) -> Result<Vec<VocabularyItem>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let alternate = serde_json::to_string(&item.alternate_meanings)
                .map_err(|e| StoreError::Corrupt(format!("alternateMeanings: {e}")))?;
            let result = sqlx::query(
                r#"
                INSERT INTO "vocabulary_items"
                    ("word", "reading", "gloss", "alternateMeanings", "partOfSpeech", "example", "level", "levelRank", "deck")
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.word)
            .bind(&item.reading)
            .bind(&item.gloss)
            .bind(&alternate)
            .bind(&item.part_of_speech)
            .bind(&item.example)
            .bind(item.level.as_str())
            .bind(item.level.rank())
            .bind(&item.deck)
            .execute(&mut *tx)
            .await?;

            created.push(VocabularyItem {
                id: result.last_insert_rowid(),
                word: item.word,
                reading: item.reading,
                gloss: item.gloss,
                alternate_meanings: item.alternate_meanings,
                part_of_speech: item.part_of_speech,
                example: item.example,
                level: item.level,
                deck: item.deck,
            });
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn get_item(&self, id: i64) -> Result<Option<VocabularyItem>, StoreError> {
        let sql = format!(r#"SELECT {ITEM_COLUMNS} FROM "vocabulary_items" WHERE "id" = ?"#);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(map_item).transpose()
    }

    async fn get_items(&self, ids: &[i64]) -> Result<Vec<VocabularyItem>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"SELECT {ITEM_COLUMNS} FROM "vocabulary_items" WHERE "id" IN ({placeholders}) ORDER BY "id""#
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_item).collect()
    }

    async fn list_items(&self, source: &LessonSource) -> Result<Vec<VocabularyItem>, StoreError> {
        let (filter, value) = match source {
            LessonSource::All => ("", None),
            LessonSource::Level(level) => (r#"WHERE "level" = ?"#, Some(level.as_str().to_string())),
            LessonSource::Deck(name) => (r#"WHERE "deck" = ?"#, Some(name.clone())),
        };
        let sql = format!(
            r#"SELECT {ITEM_COLUMNS} FROM "vocabulary_items" {filter} ORDER BY "levelRank", "id""#
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_item).collect()
    }

    async fn count_items(&self) -> Result<u64, StoreError> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "vocabulary_items""#)
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn search_items(&self, query: &str, limit: usize) -> Result<Vec<VocabularyItem>, StoreError> {
        let pattern = like_pattern(query);
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM "vocabulary_items"
            WHERE lower("word") LIKE ?1 ESCAPE '\'
               OR lower("reading") LIKE ?1 ESCAPE '\'
               OR lower("gloss") LIKE ?1 ESCAPE '\'
            ORDER BY "levelRank", "id"
            LIMIT ?2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(pattern)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_item).collect()
    }

    async fn list_decks(&self) -> Result<Vec<DeckSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "deck", COUNT(*) AS "itemCount" FROM "vocabulary_items"
            WHERE "deck" IS NOT NULL
            GROUP BY "deck"
            ORDER BY "deck"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<DeckSummary, StoreError> {
                let item_count: i64 = row.try_get("itemCount")?;
                Ok(DeckSummary {
                    name: row.try_get("deck")?,
                    item_count: item_count.max(0) as u64,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn get_progress(&self, learner_id: &str, item_id: i64) -> Result<Option<ProgressRecord>, StoreError> {
        let sql = format!(
            r#"SELECT {PROGRESS_COLUMNS} FROM "progress_records" WHERE "learnerId" = ? AND "itemId" = ?"#
        );
        let row = sqlx::query(&sql)
            .bind(learner_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_progress).transpose()
    }

    async fn list_progress(&self, learner_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let sql = format!(
            r#"SELECT {PROGRESS_COLUMNS} FROM "progress_records" WHERE "learnerId" = ? ORDER BY "itemId""#
        );
        let rows = sqlx::query(&sql).bind(learner_id).fetch_all(&self.pool).await?;
        rows.iter().map(map_progress).collect()
    }

    async fn list_due(&self, learner_id: &str, now: DateTime<Utc>) -> Result<Vec<ProgressRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PROGRESS_COLUMNS} FROM "progress_records"
            WHERE "learnerId" = ? AND "stage" <> ? AND "nextDueAt" IS NOT NULL AND "nextDueAt" <= ?
            ORDER BY "nextDueAt", "itemId"
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(learner_id)
            .bind(SrsStage::Mastered.as_str())
            .bind(to_millis(now))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_progress).collect()
    }

    async fn insert_if_absent(&self, record: &ProgressRecord) -> Result<bool, StoreError> {
        let sql = format!(
            r#"
            INSERT OR IGNORE INTO "progress_records" ({PROGRESS_COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        );
        let result = sqlx::query(&sql)
            .bind(&record.learner_id)
            .bind(record.item_id)
            .bind(record.stage.as_str())
            .bind(record.next_due_at.map(to_millis))
            .bind(record.last_reviewed_at.map(to_millis))
            .bind(to_millis(record.introduced_at))
            .bind(i64::from(record.consecutive_correct))
            .bind(i64::from(record.total_correct))
            .bind(i64::from(record.total_attempts))
            .bind(i64::from(record.foreign_to_gloss.correct))
            .bind(i64::from(record.foreign_to_gloss.attempts))
            .bind(i64::from(record.gloss_to_foreign.correct))
            .bind(i64::from(record.gloss_to_foreign.attempts))
            .bind(record.version)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn compare_and_swap(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE "progress_records" SET
                "stage" = ?, "nextDueAt" = ?, "lastReviewedAt" = ?,
                "consecutiveCorrect" = ?, "totalCorrect" = ?, "totalAttempts" = ?,
                "foreignToGlossCorrect" = ?, "foreignToGlossAttempts" = ?,
                "glossToForeignCorrect" = ?, "glossToForeignAttempts" = ?,
                "version" = "version" + 1
            WHERE "learnerId" = ? AND "itemId" = ? AND "version" = ?
            "#,
        )
        .bind(record.stage.as_str())
        .bind(record.next_due_at.map(to_millis))
        .bind(record.last_reviewed_at.map(to_millis))
        .bind(i64::from(record.consecutive_correct))
        .bind(i64::from(record.total_correct))
        .bind(i64::from(record.total_attempts))
        .bind(i64::from(record.foreign_to_gloss.correct))
        .bind(i64::from(record.foreign_to_gloss.attempts))
        .bind(i64::from(record.gloss_to_foreign.correct))
        .bind(i64::from(record.gloss_to_foreign.attempts))
        .bind(&record.learner_id)
        .bind(record.item_id)
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            let mut next = record.clone();
            next.version += 1;
            return Ok(next);
        }

        let exists: Option<i64> = sqlx::query_scalar(
            r#"SELECT "version" FROM "progress_records" WHERE "learnerId" = ? AND "itemId" = ?"#,
        )
        .bind(&record.learner_id)
        .bind(record.item_id)
        .fetch_optional(&self.pool)
        .await?;

        match exists {
            Some(_) => Err(StoreError::Conflict {
                learner_id: record.learner_id.clone(),
                item_id: record.item_id,
            }),
            None => Err(StoreError::NotFound(format!(
                "progress for item {} of learner {}",
                record.item_id, record.learner_id
            ))),
        }
    }

    async fn delete_all(&self, learner_id: &str) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query(r#"DELETE FROM "progress_records" WHERE "learnerId" = ?"#)
            .bind(learner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(r#"DELETE FROM "learner_activity" WHERE "learnerId" = ?"#)
            .bind(learner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn record_activity(&self, learner_id: &str, day: NaiveDate) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT OR IGNORE INTO "learner_activity" ("learnerId", "day") VALUES (?, ?)"#)
            .bind(learner_id)
            .bind(day.format(DAY_FORMAT).to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn activity_days(&self, learner_id: &str) -> Result<Vec<NaiveDate>, StoreError> {
        let days: Vec<String> = sqlx::query_scalar(
            r#"SELECT "day" FROM "learner_activity" WHERE "learnerId" = ? ORDER BY "day""#,
        )
        .bind(learner_id)
        .fetch_all(&self.pool)
        .await?;

        days.iter()
            .map(|day| {
                NaiveDate::parse_from_str(day, DAY_FORMAT)
                    .map_err(|_| StoreError::Corrupt(format!("activity day {day}")))
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
