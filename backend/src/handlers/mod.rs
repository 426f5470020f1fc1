//! HTTP handlers

pub mod dashboard;
pub mod estimate;
pub mod health;
pub mod lahan;

pub use dashboard::*;
pub use estimate::*;
pub use health::*;
pub use lahan::*;
