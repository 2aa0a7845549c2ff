//! Monitoring Module
//!
//! Task events emitted by the engine and the observers that consume them.
//!
//! # Components
//!
//! - [`TaskObserver`]: Receives per-task start/completion/failure events
//! - [`ExecutionTimeline`]: Task start/end timing for the run report
//! - [`ConsoleReporter`]: Per-task progress lines for the terminal

pub mod console;
pub mod events;
pub mod timeline;

pub use console::ConsoleReporter;
pub use events::{FailureReason, NoopObserver, TaskEvent, TaskObserver};
pub use timeline::{EventType, ExecutionTimeline, TaskTiming, TimelineEvent};
