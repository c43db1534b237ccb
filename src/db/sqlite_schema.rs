pub const SCHEMA_VERSION: &str = "1";

pub const SQLITE_SCHEMA_SQL: &str = r#"
-- Vocabulary is immutable once seeded.
CREATE TABLE IF NOT EXISTS "vocabulary_items" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "word" TEXT NOT NULL,
    "reading" TEXT NOT NULL,
    "gloss" TEXT NOT NULL,
    "alternateMeanings" TEXT NOT NULL DEFAULT '[]',
    "partOfSpeech" TEXT NOT NULL,
    "example" TEXT,
    "level" TEXT NOT NULL,
    "levelRank" INTEGER NOT NULL,
    "deck" TEXT
);

CREATE INDEX IF NOT EXISTS "idx_vocabulary_level" ON "vocabulary_items" ("levelRank", "id");
CREATE INDEX IF NOT EXISTS "idx_vocabulary_deck" ON "vocabulary_items" ("deck");

-- Timestamps are unix milliseconds.
CREATE TABLE IF NOT EXISTS "progress_records" (
    "learnerId" TEXT NOT NULL,
    "itemId" INTEGER NOT NULL REFERENCES "vocabulary_items" ("id"),
    "stage" TEXT NOT NULL,
    "nextDueAt" INTEGER,
    "lastReviewedAt" INTEGER,
    "introducedAt" INTEGER NOT NULL,
    "consecutiveCorrect" INTEGER NOT NULL DEFAULT 0,
    "totalCorrect" INTEGER NOT NULL DEFAULT 0,
    "totalAttempts" INTEGER NOT NULL DEFAULT 0,
    "foreignToGlossCorrect" INTEGER NOT NULL DEFAULT 0,
    "foreignToGlossAttempts" INTEGER NOT NULL DEFAULT 0,
    "glossToForeignCorrect" INTEGER NOT NULL DEFAULT 0,
    "glossToForeignAttempts" INTEGER NOT NULL DEFAULT 0,
    "version" INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY ("learnerId", "itemId")
);

CREATE INDEX IF NOT EXISTS "idx_progress_due" ON "progress_records" ("learnerId", "nextDueAt");

CREATE TABLE IF NOT EXISTS "learner_activity" (
    "learnerId" TEXT NOT NULL,
    "day" TEXT NOT NULL,
    PRIMARY KEY ("learnerId", "day")
);

CREATE TABLE IF NOT EXISTS "_db_metadata" (
    "key" TEXT PRIMARY KEY,
    "value" TEXT NOT NULL
);
"#;

/// Splits a script on `;` outside quoted text and drops `--` comment lines.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for line in sql.lines() {
        if !in_single_quote && !in_double_quote && line.trim_start().starts_with("--") {
            continue;
        }
        for ch in line.chars() {
            match ch {
                '\'' if !in_double_quote => in_single_quote = !in_single_quote,
                '"' if !in_single_quote => in_double_quote = !in_double_quote,
                ';' if !in_single_quote && !in_double_quote => {
                    push_statement(&mut statements, &current);
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        current.push('\n');
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}
