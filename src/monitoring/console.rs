//! Console Progress Reporter
//!
//! Prints one line per finished task with a running `[done/total]`
//! counter. Successful tasks can be hidden with `show_completed(false)`;
//! failures are always shown and the counter always advances.

use std::io::{self, Write};

use colored::Colorize;

use super::events::{TaskEvent, TaskObserver};

pub struct ConsoleReporter<W: Write> {
    out: W,
    total: usize,
    finished: usize,
    show_completed: bool,
}

impl ConsoleReporter<io::Stdout> {
    /// Creates a reporter writing to standard output.
    pub fn stdout(total: usize) -> Self {
        Self::new(io::stdout(), total)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            finished: 0,
            show_completed: true,
        }
    }

    pub fn show_completed(mut self, show: bool) -> Self {
        self.show_completed = show;
        self
    }

    fn counter(&self) -> String {
        let width = self.total.to_string().len();
        format!("[{:>width$}/{}]", self.finished, self.total, width = width)
    }
}

impl<W: Write> TaskObserver for ConsoleReporter<W> {
    fn on_event(&mut self, event: &TaskEvent<'_>) {
        // Write errors are ignored.
        let _ = match *event {
            TaskEvent::Started { .. } => return,
            TaskEvent::Completed { task, .. } => {
                self.finished += 1;
                if !self.show_completed {
                    return;
                }
                writeln!(self.out, "{} {} {}", self.counter(), "Completed:".green(), task)
            }
            TaskEvent::Failed { task, reason, .. } => {
                self.finished += 1;
                writeln!(
                    self.out,
                    "{} {} {} ({})",
                    self.counter(),
                    "Failed:".red().bold(),
                    task,
                    reason
                )
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::events::FailureReason;

    fn text(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_reports_completed_and_failed() {
        let mut buffer = Vec::new();
        let reason = FailureReason::ExitCode(3);
        {
            let mut reporter = ConsoleReporter::new(&mut buffer, 2);
            reporter.on_event(&TaskEvent::Started { index: 0, task: "true" });
            reporter.on_event(&TaskEvent::Completed { index: 0, task: "true" });
            reporter.on_event(&TaskEvent::Failed {
                index: 1,
                task: "false",
                reason: &reason,
            });
        }

        let text = text(buffer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[1/2]"));
        assert!(lines[0].contains("true"));
        assert!(lines[1].starts_with("[2/2]"));
        assert!(lines[1].contains("false"));
        assert!(lines[1].contains("exit code 3"));
    }

    #[test]
    fn test_hide_completed_still_counts() {
        let mut buffer = Vec::new();
        let reason = FailureReason::Signaled;
        {
            let mut reporter = ConsoleReporter::new(&mut buffer, 2).show_completed(false);
            reporter.on_event(&TaskEvent::Completed { index: 0, task: "quiet" });
            reporter.on_event(&TaskEvent::Failed {
                index: 1,
                task: "loud",
                reason: &reason,
            });
        }

        let text = text(buffer);
        assert!(!text.contains("quiet"));
        assert!(text.starts_with("[2/2]"));
        assert!(text.contains("loud"));
    }

    #[test]
    fn test_counter_padding() {
        let mut buffer = Vec::new();
        ConsoleReporter::new(&mut buffer, 100).on_event(&TaskEvent::Completed { index: 0, task: "t" });

        assert!(text(buffer).starts_with("[  1/100]"));
    }
}
