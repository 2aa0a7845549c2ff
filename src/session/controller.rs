//! Session Controller
//!
//! Drives one multiplexer session through its states:
//!
//! ```text
//! Init -> Expanding -> [ResumePrompt] -> Running -> Finalizing -> Done
//! ```
//!
//! The session is split in two calls so the caller can size its progress
//! output once the task set is known: [`Session::prepare`] covers
//! `Init` through `ResumePrompt`, [`Session::execute`] covers the rest.
//! An interrupt during `Running` goes straight to `Finalizing` with the
//! partial results.

use std::io;

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use thiserror::Error;

use super::prompt::Prompt;
use super::report::SessionReport;
use crate::checkpoint::{merge_outstanding, CheckpointError, CheckpointStore};
use crate::config::default_worker_count;
use crate::execution::{CancellationToken, Engine, EngineError, OutputSinks};
use crate::monitoring::TaskObserver;
use crate::tasks::{expand_with, Expansion, PairingAction, PayloadRecord, SkippedPairing};

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Expanding,
    ResumePrompt,
    Running,
    Finalizing,
    Done,
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("expansion aborted at {0}")]
    ExpansionAborted(SkippedPairing),

    #[error("operator prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Concurrent worker slots
    pub worker_count: usize,
    /// Offer to merge checkpointed tasks; when false the checkpoint is
    /// ignored and overwritten
    pub resume: bool,
    /// Ask the operator whether to continue after a bad pairing
    pub interactive: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            resume: true,
            interactive: false,
        }
    }
}

/// Task set ready to run, produced by [`Session::prepare`].
pub struct PreparedRun {
    engine: Engine,
    tasks: Vec<String>,
    resumed_tasks: usize,
    skipped_pairings: Vec<SkippedPairing>,
    started_at: DateTime<Local>,
}

impl PreparedRun {
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Checkpointed tasks merged into the task set.
    pub fn resumed_tasks(&self) -> usize {
        self.resumed_tasks
    }

    pub fn skipped_pairings(&self) -> &[SkippedPairing] {
        &self.skipped_pairings
    }

    pub fn worker_count(&self) -> usize {
        self.engine.worker_count()
    }
}

/// One expand-run-checkpoint cycle.
///
/// # Example
///
/// ```rust,no_run
/// use multiplexer::checkpoint::CheckpointStore;
/// use multiplexer::execution::CancellationToken;
/// use multiplexer::monitoring::NoopObserver;
/// use multiplexer::session::{AutoPrompt, Session, SessionOptions};
/// use multiplexer::tasks::PayloadRecord;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let templates = vec!["ping -c1 {0}".to_string()];
///     let payloads = vec![PayloadRecord::new(["web01"]), PayloadRecord::new(["web02"])];
///
///     let mut session = Session::new(
///         templates,
///         payloads,
///         CheckpointStore::new("/tmp/progress"),
///         SessionOptions::default(),
///     );
///     let report = session.run(&mut AutoPrompt::defaults(), &mut NoopObserver, &CancellationToken::new())?;
///     println!("{}", report.headline());
///     Ok(())
/// }
/// ```
pub struct Session {
    templates: Vec<String>,
    payloads: Vec<PayloadRecord>,
    store: CheckpointStore,
    options: SessionOptions,
    sinks: Option<OutputSinks>,
    state: SessionState,
}

impl Session {
    pub fn new(
        templates: Vec<String>,
        payloads: Vec<PayloadRecord>,
        store: CheckpointStore,
        options: SessionOptions,
    ) -> Self {
        Self {
            templates,
            payloads,
            store,
            options,
            sinks: None,
            state: SessionState::Init,
        }
    }

    /// Sets where task stdout/stderr go. Defaults to discarding both.
    pub fn set_output_sinks(&mut self, sinks: OutputSinks) {
        self.sinks = Some(sinks);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs a whole session.
    pub fn run(
        &mut self,
        prompt: &mut dyn Prompt,
        observer: &mut dyn TaskObserver,
        cancel: &CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        let prepared = self.prepare(prompt)?;
        self.execute(prepared, observer, cancel)
    }

    /// Builds the task set: expansion plus, optionally, checkpointed work.
    pub fn prepare(&mut self, prompt: &mut dyn Prompt) -> Result<PreparedRun, SessionError> {
        let started_at = Local::now();
        self.transition(SessionState::Init);

        // Fail before any work starts if progress could not be saved
        self.store.ensure_writable()?;
        let mut engine = Engine::new(self.options.worker_count)?;
        if let Some(sinks) = self.sinks.take() {
            engine.set_output_sinks(sinks);
        }

        self.transition(SessionState::Expanding);
        let expansion = self.expand(prompt)?;
        let mut tasks = expansion.tasks;
        let mut resumed_tasks = 0;

        if self.options.resume {
            let checkpointed = self.store.load_outstanding()?;

            if !checkpointed.is_empty() {
                self.transition(SessionState::ResumePrompt);
                let question = format!(
                    "There are {} unfinished task(s) remaining, run them now?",
                    checkpointed.len()
                );

                if prompt.confirm(&question, true).map_err(SessionError::Prompt)? {
                    let before = tasks.len();
                    tasks = merge_outstanding(&checkpointed, &tasks);
                    resumed_tasks = checkpointed.len();
                    info!(
                        "Resuming {} checkpointed task(s); task set {} -> {}",
                        checkpointed.len(),
                        before,
                        tasks.len()
                    );
                } else {
                    info!("Checkpointed tasks declined; they will be replaced at the end of this run");
                }
            }
        } else {
            info!(
                "Ignoring savefile contents at {}",
                self.store.path().display()
            );
        }

        Ok(PreparedRun {
            engine,
            tasks,
            resumed_tasks,
            skipped_pairings: expansion.skipped,
            started_at,
        })
    }

    /// Runs the prepared tasks and writes the final checkpoint.
    pub fn execute(
        &mut self,
        prepared: PreparedRun,
        observer: &mut dyn TaskObserver,
        cancel: &CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        self.transition(SessionState::Running);
        let outcome = prepared.engine.run(&prepared.tasks, cancel, observer);

        self.transition(SessionState::Finalizing);
        if outcome.cancelled {
            warn!("Run interrupted; saving outstanding tasks");
        }

        if outcome.incomplete.is_empty() {
            self.store.clear()?;
        } else {
            self.store.save_outstanding(&outcome.incomplete)?;
        }

        self.transition(SessionState::Done);

        Ok(SessionReport {
            started_at: prepared.started_at,
            finished_at: Local::now(),
            checkpoint_path: self.store.path().to_path_buf(),
            total_tasks: prepared.tasks.len(),
            resumed_tasks: prepared.resumed_tasks,
            skipped_pairings: prepared.skipped_pairings,
            completed: outcome.completed.len(),
            failed: outcome.failed,
            outstanding: outcome.incomplete,
            interrupted: outcome.cancelled,
            elapsed: outcome.elapsed,
            timeline: outcome.timeline,
        })
    }

    fn expand(&self, prompt: &mut dyn Prompt) -> Result<Expansion, SessionError> {
        let interactive = self.options.interactive;
        let mut prompt_error: Option<io::Error> = None;

        let result = expand_with(&self.templates, &self.payloads, |pairing| {
            if !interactive {
                return PairingAction::Skip;
            }

            let question = format!("Cannot fill {}. Continue without it?", pairing);
            match prompt.confirm(&question, true) {
                Ok(true) => PairingAction::Skip,
                Ok(false) => PairingAction::Abort,
                Err(e) => {
                    prompt_error = Some(e);
                    PairingAction::Abort
                }
            }
        });

        if let Some(e) = prompt_error {
            return Err(SessionError::Prompt(e));
        }

        result.map_err(SessionError::ExpansionAborted)
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
