//! Task Generation Module
//!
//! Turns command templates and payload records into the flat list of
//! tasks the engine runs.
//!
//! # Structure
//!
//! - [`input`]: Template and payload readers
//! - [`template`]: Positional placeholder substitution
//! - [`expander`]: Template x payload cross-product

pub mod expander;
pub mod input;
pub mod template;

pub use expander::{expand, expand_with, Expansion, PairingAction, SkippedPairing};
pub use input::{read_payloads, read_templates, PayloadRecord};
pub use template::{substitute, TemplateError};
