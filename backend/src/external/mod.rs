//! External API integrations

pub mod predictor;

pub use predictor::{PredictorClient, YieldPredictor};
