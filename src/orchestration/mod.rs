//! Session lifecycle: load, mutate under a per-session lock, then request a save.

pub mod orchestrator;

pub use orchestrator::{MutationOutcome, OrchestrationError, SessionOrchestrator};
