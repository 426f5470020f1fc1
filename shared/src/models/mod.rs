//! Domain models for the Saw-it plantation platform

mod dashboard;
mod feature;
mod lahan;
mod observation;
mod prediction;

pub use dashboard::*;
pub use feature::*;
pub use lahan::*;
pub use observation::*;
pub use prediction::*;
