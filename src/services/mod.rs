pub mod dashboard;
pub mod dictionary;
pub mod error;
pub mod session;
pub mod settings;

pub use dashboard::{DashboardAggregator, DashboardSummary};
pub use error::SrsError;
pub use session::SessionOrchestrator;
