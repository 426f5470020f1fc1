//! Business logic services for the Saw-it plantation platform

pub mod dashboard;
pub mod estimate;
pub mod lahan;
pub mod prediction;

pub use dashboard::DashboardService;
pub use estimate::EstimateService;
pub use lahan::LahanService;
pub use prediction::PredictionService;
