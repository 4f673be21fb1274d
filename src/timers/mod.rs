//! Timer scheduling for the carousel state machines.
//!
//! This module provides:
//! - `Scheduler` - The one-shot timer seam every state machine schedules through
//! - `ManualScheduler` - Deterministic virtual clock for frame loops and tests
//! - `TokioScheduler` - Real timers backed by tokio tasks and a flume channel

pub mod manual;
pub mod scheduler;
pub mod tokio_scheduler;

pub use manual::*;
pub use scheduler::*;
pub use tokio_scheduler::*;
