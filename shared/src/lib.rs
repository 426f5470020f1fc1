//! Shared types and models for the Saw-it plantation platform
//!
//! This crate contains the domain types and pure computations shared between
//! the backend, the browser (via WASM), and other components of the system.
//! The yield predictor's feature window builder lives here so it can run
//! without a database or network.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
