use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::SrsConfig;
use crate::db::Stores;
use crate::services::{DashboardAggregator, SessionOrchestrator};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    stores: Stores,
    srs: SrsConfig,
    orchestrator: Arc<SessionOrchestrator>,
    dashboard: Arc<DashboardAggregator>,
}

impl AppState {
    pub fn new(stores: Stores, srs: SrsConfig) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            orchestrator: Arc::new(SessionOrchestrator::new(&stores, srs)),
            dashboard: Arc::new(DashboardAggregator::new(&stores, srs)),
            stores,
            srs,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn srs_config(&self) -> SrsConfig {
        self.srs
    }

    pub fn orchestrator(&self) -> &Arc<SessionOrchestrator> {
        &self.orchestrator
    }

    pub fn dashboard(&self) -> &DashboardAggregator {
        &self.dashboard
    }
}
