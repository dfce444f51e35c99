//! Shared types and calculations for the KnightCycle recycling rewards program
//!
//! This crate holds the pure core used by the engine service and, via WASM,
//! by the browser: point calculation, premium eligibility, and recurring
//! collection dates. Nothing in here performs I/O.

pub mod error;
pub mod models;
pub mod rewards;
pub mod schedule;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use rewards::*;
pub use schedule::*;
pub use types::*;
pub use validation::*;
