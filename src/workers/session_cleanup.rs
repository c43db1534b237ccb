use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::services::SessionOrchestrator;

pub async fn evict_idle_sessions(orchestrator: Arc<SessionOrchestrator>) -> Result<usize, super::WorkerError> {
    let start = Instant::now();
    debug!("Starting session cleanup cycle");

    let evicted = orchestrator.evict_idle_sessions(Utc::now());
    let remaining = orchestrator.sessions().len();

    if evicted > 0 {
        info!(
            evicted,
            remaining,
            duration_ms = start.elapsed().as_millis() as u64,
            "Idle sessions evicted"
        );
    }

    Ok(evicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SrsConfig;
    use crate::db::Stores;
    use crate::services::session::{QuizMode, QuizRequest};

    #[tokio::test]
    async fn test_sweep_keeps_fresh_sessions() {
        let stores = Stores::in_memory();
        crate::seed::seed_vocabulary(stores.vocabulary.as_ref()).await.unwrap();
        let orchestrator = Arc::new(SessionOrchestrator::new(&stores, SrsConfig::default()));
        let request = QuizRequest {
            item_ids: vec![1],
            mode: QuizMode::Adhoc,
            seed: Some(3),
        };
        orchestrator.start_quiz("alice", &request, Utc::now()).await.unwrap();

        assert_eq!(evict_idle_sessions(orchestrator.clone()).await.unwrap(), 0);
        assert_eq!(orchestrator.sessions().len(), 1);
    }
}
