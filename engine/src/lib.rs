//! KnightCycle rewards engine
//!
//! Host-facing layer over the pure calculations in `shared`: configuration,
//! error handling, logging, and the explicit state transitions that tell the
//! host which points to award and which emails to send.

pub mod config;
pub mod effects;
pub mod error;
pub mod jobs;
pub mod services;

pub use config::Config;
pub use effects::{Effect, Email, EmailKind};
pub use error::{EngineError, EngineResult};
