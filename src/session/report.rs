//! Session Report
//!
//! What a finished session did and where its outstanding work went.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::monitoring::ExecutionTimeline;
use crate::tasks::SkippedPairing;

/// Number of slowest tasks listed in the detailed summary.
const SLOWEST_LISTED: usize = 5;

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Location of the checkpoint written or cleared at the end
    pub checkpoint_path: PathBuf,
    /// Size of the task set handed to the engine
    pub total_tasks: usize,
    /// Checkpointed tasks merged into the task set
    pub resumed_tasks: usize,
    /// Template/payload pairings left out of the task set
    pub skipped_pairings: Vec<SkippedPairing>,
    /// Tasks that exited 0
    pub completed: usize,
    /// Tasks that ran and failed, in task order
    pub failed: Vec<String>,
    /// Tasks written to the checkpoint, in task order
    pub outstanding: Vec<String>,
    /// True when the run was cut short by an interrupt
    pub interrupted: bool,
    pub elapsed: Duration,
    pub timeline: ExecutionTimeline,
}

impl SessionReport {
    /// True when nothing is left in the checkpoint.
    pub fn is_complete(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// Outstanding tasks that did not fail: never started or abandoned
    /// in flight by an interrupt.
    pub fn not_attempted(&self) -> usize {
        self.outstanding.len().saturating_sub(self.failed.len())
    }

    /// One-line outcome for the operator.
    pub fn headline(&self) -> String {
        let path = self.checkpoint_path.display();
        if self.is_complete() {
            format!(
                "All {} task(s) completed successfully. Savefile {} cleared.",
                self.total_tasks, path
            )
        } else if self.interrupted {
            format!(
                "Interrupted: {} task(s) outstanding ({} not run), saved to {}.",
                self.outstanding.len(),
                self.not_attempted(),
                path
            )
        } else {
            format!(
                "{} task(s) unfinished ({} failed), saved to {}.",
                self.outstanding.len(),
                self.failed.len(),
                path
            )
        }
    }

    /// Multi-line summary including timing and the slowest tasks.
    pub fn details(&self) -> String {
        let mut text = String::new();

        let _ = writeln!(
            text,
            "Started {}, finished {} ({:.2?})",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.finished_at.format("%Y-%m-%d %H:%M:%S"),
            self.elapsed
        );
        let _ = writeln!(
            text,
            "Tasks: {} total, {} completed, {} failed, {} not run, {} resumed from savefile",
            self.total_tasks,
            self.completed,
            self.failed.len(),
            self.not_attempted(),
            self.resumed_tasks
        );

        if !self.skipped_pairings.is_empty() {
            let _ = writeln!(
                text,
                "Skipped {} template/payload pairing(s)",
                self.skipped_pairings.len()
            );
        }

        let slowest = self.timeline.slowest(SLOWEST_LISTED);
        if !slowest.is_empty() {
            let _ = writeln!(text, "Slowest tasks:");
            for timing in slowest {
                let _ = writeln!(text, "  {:>10.2?}  {}", timing.duration, timing.task);
            }
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::EventType;

    fn report(outstanding: &[&str], failed: &[&str], interrupted: bool) -> SessionReport {
        let now = Local::now();
        SessionReport {
            started_at: now,
            finished_at: now,
            checkpoint_path: PathBuf::from("/home/op/.multiplexer_progress"),
            total_tasks: 4,
            resumed_tasks: 1,
            skipped_pairings: Vec::new(),
            completed: 4 - outstanding.len(),
            failed: failed.iter().map(|s| s.to_string()).collect(),
            outstanding: outstanding.iter().map(|s| s.to_string()).collect(),
            interrupted,
            elapsed: Duration::from_millis(1500),
            timeline: ExecutionTimeline::new(),
        }
    }

    #[test]
    fn test_headline_complete() {
        let report = report(&[], &[], false);
        assert!(report.is_complete());
        assert!(report.headline().starts_with("All 4 task(s) completed"));
        assert!(report.headline().contains(".multiplexer_progress"));
    }

    #[test]
    fn test_headline_unfinished() {
        let report = report(&["false a", "sleep 9"], &["false a"], false);
        assert_eq!(
            report.headline(),
            "2 task(s) unfinished (1 failed), saved to /home/op/.multiplexer_progress."
        );
    }

    #[test]
    fn test_headline_interrupted() {
        let report = report(&["sleep 9"], &[], true);
        assert!(report.headline().starts_with("Interrupted: 1 task(s) outstanding (1 not run)"));
    }

    #[test]
    fn test_not_attempted_excludes_failures() {
        let report = report(&["false a", "sleep 9", "sleep 8"], &["false a"], true);

        assert_eq!(report.not_attempted(), 2);
        assert!(report.details().contains("1 failed, 2 not run"));
    }

    #[test]
    fn test_details_lists_slowest() {
        let mut report = report(&[], &[], false);
        report.timeline.add_event(0, "sleep 1", EventType::Started);
        report.timeline.add_event(0, "sleep 1", EventType::Completed);

        let details = report.details();
        assert!(details.contains("4 total"));
        assert!(details.contains("1 resumed"));
        assert!(details.contains("Slowest tasks:"));
        assert!(details.contains("sleep 1"));
    }
}
