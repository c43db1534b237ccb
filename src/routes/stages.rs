use axum::response::Response;
use serde::Serialize;

use crate::response::ok;
use crate::srs::SrsStage;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageInfo {
    stage: SrsStage,
    label: &'static str,
    /// Seconds until the next review after landing here; absent when none is scheduled.
    interval_secs: Option<i64>,
    description: &'static str,
}

pub async fn list() -> Response {
    let stages: Vec<StageInfo> = SrsStage::ALL
        .into_iter()
        .map(|stage| StageInfo {
            stage,
            label: stage.label(),
            interval_secs: stage.interval().map(|interval| interval.num_seconds()),
            description: stage.description(),
        })
        .collect();
    ok(stages)
}
