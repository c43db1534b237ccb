use crate::db::models::{LevelTag, NewVocabularyItem};
use crate::db::{StoreError, VocabularyStore};

struct SeedWord {
    word: &'static str,
    reading: &'static str,
    gloss: &'static str,
    part_of_speech: &'static str,
    example: Option<&'static str>,
    level: LevelTag,
}

const fn n5(word: &'static str, reading: &'static str, gloss: &'static str, part_of_speech: &'static str) -> SeedWord {
    SeedWord { word, reading, gloss, part_of_speech, example: None, level: LevelTag::N5 }
}

const fn n4(word: &'static str, reading: &'static str, gloss: &'static str, part_of_speech: &'static str) -> SeedWord {
    SeedWord { word, reading, gloss, part_of_speech, example: None, level: LevelTag::N4 }
}

const SEED_WORDS: &[SeedWord] = &[
    SeedWord {
        word: "猫",
        reading: "ねこ",
        gloss: "cat",
        part_of_speech: "noun",
        example: Some("猫が好きです。"),
        level: LevelTag::N5,
    },
    SeedWord {
        word: "犬",
        reading: "いぬ",
        gloss: "dog",
        part_of_speech: "noun",
        example: Some("犬と散歩します。"),
        level: LevelTag::N5,
    },
    n5("足", "あし", "foot, leg", "noun"),
    n5("手", "て", "hand", "noun"),
    n5("目", "め", "eye", "noun"),
    n5("口", "くち", "mouth", "noun"),
    n5("耳", "みみ", "ear", "noun"),
    n5("水", "みず", "water", "noun"),
    n5("山", "やま", "mountain", "noun"),
    n5("川", "かわ", "river", "noun"),
    n5("雨", "あめ", "rain", "noun"),
    n5("本", "ほん", "book", "noun"),
    n5("車", "くるま", "car", "noun"),
    n5("学校", "がっこう", "school", "noun"),
    n5("先生", "せんせい", "teacher", "noun"),
    n5("友達", "ともだち", "friend", "noun"),
    n5("時間", "じかん", "time, hours", "noun"),
    n5("今日", "きょう", "today", "noun"),
    n5("明日", "あした", "tomorrow", "noun"),
    n5("食べる", "たべる", "to eat", "verb"),
    n5("飲む", "のむ", "to drink", "verb"),
    n5("見る", "みる", "to see, to look", "verb"),
    n5("行く", "いく", "to go", "verb"),
    n5("来る", "くる", "to come", "verb"),
    n5("大きい", "おおきい", "big, large", "i-adjective"),
    n5("小さい", "ちいさい", "small, little", "i-adjective"),
    n5("新しい", "あたらしい", "new", "i-adjective"),
    n5("高い", "たかい", "expensive; tall, high", "i-adjective"),
    n5("静か", "しずか", "quiet", "na-adjective"),
    n5("元気", "げんき", "healthy, energetic", "na-adjective"),
    n4("経験", "けいけん", "experience", "noun"),
    n4("意見", "いけん", "opinion", "noun"),
    n4("世界", "せかい", "world", "noun"),
    n4("空港", "くうこう", "airport", "noun"),
    n4("準備", "じゅんび", "preparation", "noun"),
    n4("届ける", "とどける", "to deliver", "verb"),
    n4("集める", "あつめる", "to collect, to gather", "verb"),
    n4("決める", "きめる", "to decide", "verb"),
    n4("珍しい", "めずらしい", "rare, unusual", "i-adjective"),
    n4("丁寧", "ていねい", "polite, careful", "na-adjective"),
];

fn seed_items() -> Vec<NewVocabularyItem> {
    SEED_WORDS
        .iter()
        .map(|seed| NewVocabularyItem {
            word: seed.word.to_string(),
            reading: seed.reading.to_string(),
            gloss: seed.gloss.to_string(),
            alternate_meanings: Vec::new(),
            part_of_speech: seed.part_of_speech.to_string(),
            example: seed.example.map(str::to_string),
            level: seed.level,
            deck: None,
        })
        .collect()
}

/// Imports the built-in N5/N4 list into an empty vocabulary store. Returns the
/// number of items inserted (0 when vocabulary already exists).
pub async fn seed_vocabulary(store: &dyn VocabularyStore) -> Result<usize, StoreError> {
    let existing = store.count_items().await?;
    if existing > 0 {
        tracing::debug!(existing, "vocabulary already present, skipping seed");
        return Ok(0);
    }

    let inserted = store.insert_items(seed_items()).await?.len();
    tracing::info!(inserted, "seeded built-in vocabulary");
    Ok(inserted)
}
