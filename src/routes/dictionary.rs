use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::response::service_response;
use crate::services::dictionary;
use crate::state::AppState;

use super::parse_item_id;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    service_response(dictionary::search(state.stores(), &query.q).await)
}

pub async fn decks(State(state): State<AppState>) -> Response {
    service_response(dictionary::decks(state.stores()).await)
}

pub async fn detail(
    State(state): State<AppState>,
    Path((learner_id, item_id)): Path<(String, String)>,
) -> Response {
    let item_id = match parse_item_id(&item_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    service_response(dictionary::word_detail(state.stores(), &learner_id, item_id).await)
}
