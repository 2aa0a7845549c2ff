//! Checkpoint Module
//!
//! Durable record of outstanding work between sessions.
//!
//! - [`store`]: Savefile loading, atomic replacement and clearing
//! - [`merge`]: Union of checkpointed and freshly expanded tasks

pub mod merge;
pub mod store;

pub use merge::merge_outstanding;
pub use store::{read_outstanding, write_outstanding, CheckpointError, CheckpointStore};
