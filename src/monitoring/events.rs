//! Task Events
//!
//! The engine reports every dispatch and every outcome through a
//! [`TaskObserver`]. Observers are called from the engine loop only,
//! never from worker threads.

use std::fmt;

/// Why a task did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Process exited with a non-zero code
    ExitCode(i32),
    /// Process was terminated by a signal
    Signaled,
    /// Process could not be started
    Launch(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitCode(code) => write!(f, "exit code {}", code),
            Self::Signaled => write!(f, "terminated by signal"),
            Self::Launch(reason) => write!(f, "failed to launch: {}", reason),
        }
    }
}

/// A single engine event for one task.
///
/// `index` is the task's position in the run's task list, so identical
/// commands dispatched twice stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent<'a> {
    Started {
        index: usize,
        task: &'a str,
    },
    Completed {
        index: usize,
        task: &'a str,
    },
    Failed {
        index: usize,
        task: &'a str,
        reason: &'a FailureReason,
    },
}

impl<'a> TaskEvent<'a> {
    /// Returns the task this event belongs to.
    pub fn task(&self) -> &'a str {
        match *self {
            Self::Started { task, .. } | Self::Completed { task, .. } | Self::Failed { task, .. } => {
                task
            }
        }
    }

    /// Returns the task's position in the run.
    pub fn index(&self) -> usize {
        match *self {
            Self::Started { index, .. }
            | Self::Completed { index, .. }
            | Self::Failed { index, .. } => index,
        }
    }
}

/// Receives task events as the engine produces them.
pub trait TaskObserver {
    fn on_event(&mut self, event: &TaskEvent<'_>);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TaskObserver for NoopObserver {
    fn on_event(&mut self, _event: &TaskEvent<'_>) {}
}

impl<F> TaskObserver for F
where
    F: FnMut(&TaskEvent<'_>),
{
    fn on_event(&mut self, event: &TaskEvent<'_>) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_display() {
        assert_eq!(FailureReason::ExitCode(2).to_string(), "exit code 2");
        assert_eq!(FailureReason::Signaled.to_string(), "terminated by signal");
        assert_eq!(
            FailureReason::Launch("no such file".to_string()).to_string(),
            "failed to launch: no such file"
        );
    }

    #[test]
    fn test_event_task_accessor() {
        let reason = FailureReason::ExitCode(1);
        assert_eq!(TaskEvent::Started { index: 0, task: "a" }.task(), "a");
        assert_eq!(TaskEvent::Completed { index: 1, task: "b" }.task(), "b");

        let failed = TaskEvent::Failed {
            index: 2,
            task: "c",
            reason: &reason,
        };
        assert_eq!(failed.task(), "c");
        assert_eq!(failed.index(), 2);
    }

    #[test]
    fn test_closure_observer() {
        let mut count = 0;
        {
            let mut observer = |_: &TaskEvent<'_>| count += 1;
            observer.on_event(&TaskEvent::Started { index: 0, task: "x" });
            observer.on_event(&TaskEvent::Completed { index: 0, task: "x" });
        }
        assert_eq!(count, 2);
    }
}
