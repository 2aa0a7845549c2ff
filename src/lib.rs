//! Multiplexer - Parallel Command Template Runner
//!
//! Expands a template of shell commands against tab-separated payload
//! records, runs the resulting tasks on a bounded pool of workers and
//! keeps a savefile of unfinished tasks so an interrupted batch can be
//! resumed without re-running what already succeeded.
//!
//! # Architecture
//!
//! - [`tasks`]: Template/payload reading and cross-product expansion
//! - [`checkpoint`]: Savefile persistence and resume merging
//! - [`execution`]: Worker pool, task processes and cancellation
//! - [`monitoring`]: Task events, timeline and console progress
//! - [`session`]: Session state machine tying the above together
//! - [`config`]: Defaults for worker count, savefile and output sinks
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use multiplexer::checkpoint::CheckpointStore;
//! use multiplexer::execution::CancellationToken;
//! use multiplexer::monitoring::NoopObserver;
//! use multiplexer::session::{AutoPrompt, Session, SessionOptions};
//! use multiplexer::tasks::{read_payloads, read_templates};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let templates = read_templates(BufReader::new(File::open("commands.txt")?))?;
//!     let payloads = read_payloads(BufReader::new(File::open("hosts.tsv")?))?;
//!
//!     let mut session = Session::new(
//!         templates,
//!         payloads,
//!         CheckpointStore::new("/tmp/progress"),
//!         SessionOptions::default(),
//!     );
//!     let report = session.run(&mut AutoPrompt::defaults(), &mut NoopObserver, &CancellationToken::new())?;
//!     println!("{}", report.headline());
//!     Ok(())
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod execution;
pub mod monitoring;
pub mod session;
pub mod tasks;

// Re-export commonly used types
pub use checkpoint::CheckpointStore;
pub use execution::{CancellationToken, Engine};
pub use session::{Session, SessionOptions, SessionReport};
pub use tasks::{expand, PayloadRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Multiplexer";
