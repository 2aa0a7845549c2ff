//! Session Module
//!
//! Orchestrates expansion, resume, execution and checkpointing for one
//! run, and the operator interaction around it.
//!
//! - [`controller`]: Session state machine
//! - [`prompt`]: Yes/no questions to the operator
//! - [`report`]: End-of-session summary

pub mod controller;
pub mod prompt;
pub mod report;

pub use controller::{PreparedRun, Session, SessionError, SessionOptions, SessionState};
pub use prompt::{open_terminal, parse_answer, AutoPrompt, Prompt, StreamPrompt, TerminalPrompt};
pub use report::SessionReport;
