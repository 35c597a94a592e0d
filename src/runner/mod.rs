//! Pass orchestration.

pub mod engine;
pub mod pass;

pub use engine::{find_engine_installer, EngineHandler, EngineOutcome};
pub use pass::{Orchestrator, PassOutcome, PassReport};
