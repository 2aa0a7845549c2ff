//! Task Execution Module
//!
//! Provides the worker pool that runs tasks as child processes,
//! including cancellation and output redirection.
//!
//! # Architecture
//!
//! - [`engine`]: Bounded worker pool and completion bookkeeping
//! - [`task`]: Single task process execution
//! - [`cancel`]: Cancellation token shared with the interrupt handler
//! - [`sinks`]: Stdout/stderr destinations for task processes

pub mod cancel;
pub mod engine;
pub mod sinks;
pub mod task;

pub use cancel::CancellationToken;
pub use engine::{Engine, EngineError, RunOutcome};
pub use sinks::{OutputSinks, Sink};
pub use task::{execute_task, TaskOutcome};
