#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use kotoba_backend::config::SrsConfig;
use kotoba_backend::db::models::{LevelTag, NewVocabularyItem, VocabularyItem};
use kotoba_backend::db::Stores;
use kotoba_backend::seed::seed_vocabulary;
use kotoba_backend::services::{DashboardAggregator, SessionOrchestrator};
use kotoba_backend::srs::Direction;

pub async fn create_test_app() -> Router {
    kotoba_backend::create_app().await
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => request.body(Body::from(json.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 9, 0, 0).unwrap()
}

pub struct Harness {
    pub stores: Stores,
    pub orchestrator: Arc<SessionOrchestrator>,
    pub dashboard: DashboardAggregator,
}

impl Harness {
    pub fn new(stores: Stores) -> Self {
        Self::with_config(stores, SrsConfig::default())
    }

    pub fn with_config(stores: Stores, config: SrsConfig) -> Self {
        Self {
            orchestrator: Arc::new(SessionOrchestrator::new(&stores, config)),
            dashboard: DashboardAggregator::new(&stores, config),
            stores,
        }
    }

    pub async fn seeded() -> Self {
        let stores = Stores::in_memory();
        seed_vocabulary(stores.vocabulary.as_ref()).await.unwrap();
        Self::new(stores)
    }

    pub async fn item(&self, id: i64) -> VocabularyItem {
        self.stores.vocabulary.get_item(id).await.unwrap().unwrap()
    }
}

pub fn custom_item(n: usize) -> NewVocabularyItem {
    NewVocabularyItem {
        word: format!("語{n}"),
        reading: format!("ご{n}"),
        gloss: format!("word {n}"),
        alternate_meanings: Vec::new(),
        part_of_speech: "noun".to_string(),
        example: None,
        level: LevelTag::Custom,
        deck: Some("drill".to_string()),
    }
}

pub fn correct_answer(item: &VocabularyItem, direction: Direction) -> String {
    match direction {
        Direction::ForeignToGloss => item.gloss.clone(),
        Direction::GlossToForeign => item.reading.clone(),
    }
}
