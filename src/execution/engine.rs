//! Task Execution Engine
//!
//! Runs a task list under a fixed number of worker slots:
//! - Tasks are dispatched in list order as slots free up
//! - Each in-flight task runs on its own thread, waiting on its child
//! - Workers report back over a channel; the engine loop is the only
//!   owner of the completed set
//! - A cancellation token stops dispatch and returns immediately with
//!   whatever has been confirmed so far

use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use thiserror::Error;

use super::cancel::CancellationToken;
use super::sinks::OutputSinks;
use super::task::{execute_task, TaskOutcome};
use crate::monitoring::{ExecutionTimeline, TaskEvent, TaskObserver};

/// How often the engine checks for cancellation while tasks are running.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Engine configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("worker count must be at least 1")]
    NoWorkers,
}

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Tasks that exited 0
    pub completed: HashSet<String>,
    /// Tasks that ran and failed, in task order
    pub failed: Vec<String>,
    /// Tasks not in `completed`, in task order
    pub incomplete: Vec<String>,
    /// True when the run stopped on a cancellation request
    pub cancelled: bool,
    /// Start/end times of every dispatched task
    pub timeline: ExecutionTimeline,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Bounded worker pool for task processes.
///
/// # Example
///
/// ```rust,no_run
/// use multiplexer::execution::{CancellationToken, Engine};
/// use multiplexer::monitoring::NoopObserver;
///
/// let engine = Engine::new(4).unwrap();
/// let tasks = vec!["ping -c1 web01".to_string(), "ping -c1 web02".to_string()];
///
/// let outcome = engine.run(&tasks, &CancellationToken::new(), &mut NoopObserver);
/// println!("{} task(s) left", outcome.incomplete.len());
/// ```
pub struct Engine {
    worker_count: usize,
    sinks: Arc<OutputSinks>,
}

impl Engine {
    /// Creates an engine with `worker_count` concurrent slots.
    pub fn new(worker_count: usize) -> Result<Self, EngineError> {
        if worker_count == 0 {
            return Err(EngineError::NoWorkers);
        }

        Ok(Self {
            worker_count,
            sinks: Arc::new(OutputSinks::default()),
        })
    }

    /// Sets where task stdout/stderr go.
    pub fn set_output_sinks(&mut self, sinks: OutputSinks) {
        self.sinks = Arc::new(sinks);
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Runs every task, or as many as possible before cancellation.
    pub fn run(
        &self,
        tasks: &[String],
        cancel: &CancellationToken,
        observer: &mut dyn TaskObserver,
    ) -> RunOutcome {
        let start_time = Instant::now();
        let mut tally = Tally::default();
        let mut cancelled = false;

        info!(
            "Starting execution of {} task(s) on {} worker(s)",
            tasks.len(),
            self.worker_count
        );

        let (tx, rx): (Sender<(usize, TaskOutcome)>, Receiver<(usize, TaskOutcome)>) = channel();

        let mut next_index = 0;
        let mut running_count = 0;

        loop {
            // Fill free slots in task order
            while running_count < self.worker_count
                && next_index < tasks.len()
                && !cancel.is_cancelled()
            {
                let index = next_index;
                let task = tasks[index].clone();
                next_index += 1;

                debug!("Dispatching task {}: {}", index, task);
                let event = TaskEvent::Started { index, task: &task };
                tally.timeline.on_event(&event);
                observer.on_event(&event);

                let tx = tx.clone();
                let sinks = Arc::clone(&self.sinks);
                thread::spawn(move || {
                    let outcome = execute_task(&task, &sinks);
                    // The receiver is gone once the engine returned after a cancellation
                    if tx.send((index, outcome)).is_err() {
                        debug!("Result for abandoned task '{}' dropped", task);
                    }
                });

                running_count += 1;
            }

            if cancel.is_cancelled() {
                // Keep results that arrived before the cancellation was seen
                while let Ok((index, outcome)) = rx.try_recv() {
                    running_count -= 1;
                    tally.record(tasks, index, outcome, observer);
                }

                if running_count > 0 {
                    warn!("Cancelled with {} task(s) still running", running_count);
                } else {
                    info!("Cancelled");
                }
                cancelled = true;
                break;
            }

            if running_count == 0 {
                break;
            }

            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok((index, outcome)) => {
                    running_count -= 1;
                    tally.record(tasks, index, outcome, observer);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    // Unreachable while `tx` is held here; treat as a lost pool
                    error!("Worker channel closed with {} task(s) running", running_count);
                    cancelled = true;
                    break;
                }
            }
        }

        let Tally {
            completed,
            mut failed_indices,
            timeline,
        } = tally;

        failed_indices.sort_unstable();
        let failed: Vec<String> = failed_indices
            .into_iter()
            .map(|i| tasks[i].clone())
            .filter(|task| !completed.contains(task))
            .collect();

        let incomplete: Vec<String> = tasks
            .iter()
            .filter(|task| !completed.contains(*task))
            .cloned()
            .collect();

        let elapsed = start_time.elapsed();
        info!(
            "Execution finished in {:.2?}: {} completed, {} failed, {} incomplete",
            elapsed,
            completed.len(),
            failed.len(),
            incomplete.len()
        );

        RunOutcome {
            completed,
            failed,
            incomplete,
            cancelled,
            timeline,
            elapsed,
        }
    }
}

/// Results gathered by the engine loop.
#[derive(Default)]
struct Tally {
    completed: HashSet<String>,
    failed_indices: Vec<usize>,
    timeline: ExecutionTimeline,
}

impl Tally {
    fn record(
        &mut self,
        tasks: &[String],
        index: usize,
        outcome: TaskOutcome,
        observer: &mut dyn TaskObserver,
    ) {
        let task = tasks[index].as_str();

        let event = match &outcome {
            TaskOutcome::Succeeded => {
                debug!("Task succeeded: {}", task);
                self.completed.insert(task.to_string());
                TaskEvent::Completed { index, task }
            }
            TaskOutcome::Failed(reason) => {
                warn!("Task failed ({}): {}", reason, task);
                self.failed_indices.push(index);
                TaskEvent::Failed {
                    index,
                    task,
                    reason,
                }
            }
        };

        self.timeline.on_event(&event);
        observer.on_event(&event);
    }
}
