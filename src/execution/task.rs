//! Individual Task Execution
//!
//! Runs one task string as a child process:
//! - The command is split on whitespace into program and arguments
//! - No shell is involved, so quoting and redirection are not interpreted
//! - Stdin is closed; stdout/stderr follow the configured sinks

use std::process::{Command, ExitStatus};

use log::debug;

use super::sinks::OutputSinks;
use crate::monitoring::FailureReason;

/// Outcome of running one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed(FailureReason),
}

/// Executes a single task and waits for it to exit.
///
/// Launch problems are reported as a failed outcome, never as a panic or
/// an error that would stop the pool.
pub fn execute_task(command: &str, sinks: &OutputSinks) -> TaskOutcome {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return TaskOutcome::Failed(FailureReason::Launch("empty command".to_string()));
    };

    let mut cmd = Command::new(program);
    cmd.args(parts).stdin(std::process::Stdio::null());

    match (sinks.stdout.to_stdio(), sinks.stderr.to_stdio()) {
        (Ok(stdout), Ok(stderr)) => {
            cmd.stdout(stdout).stderr(stderr);
        }
        (Err(e), _) | (_, Err(e)) => {
            return TaskOutcome::Failed(FailureReason::Launch(format!(
                "cannot attach output: {}",
                e
            )));
        }
    }

    debug!("Spawning: {}", command);

    match cmd.status() {
        Ok(status) => classify(status),
        Err(e) => TaskOutcome::Failed(FailureReason::Launch(format!("{}: {}", program, e))),
    }
}

/// Maps an exit status to an outcome. Only exit code 0 is success.
fn classify(status: ExitStatus) -> TaskOutcome {
    match status.code() {
        Some(0) => TaskOutcome::Succeeded,
        Some(code) => TaskOutcome::Failed(FailureReason::ExitCode(code)),
        None => TaskOutcome::Failed(FailureReason::Signaled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::sinks::Sink;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_successful_task() {
        let outcome = execute_task("true", &OutputSinks::discard());
        assert_eq!(outcome, TaskOutcome::Succeeded);
    }

    #[test]
    fn test_failing_task() {
        let outcome = execute_task("false", &OutputSinks::discard());
        assert_eq!(outcome, TaskOutcome::Failed(FailureReason::ExitCode(1)));
    }

    #[test]
    fn test_arguments_are_passed() {
        let temp_dir = tempdir().unwrap();
        let marker = temp_dir.path().join("marker");

        let outcome = execute_task(
            &format!("touch {}", marker.display()),
            &OutputSinks::discard(),
        );

        assert_eq!(outcome, TaskOutcome::Succeeded);
        assert!(marker.exists());
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let outcome = execute_task("definitely-not-a-real-program-xyz", &OutputSinks::discard());
        assert!(matches!(
            outcome,
            TaskOutcome::Failed(FailureReason::Launch(_))
        ));
    }

    #[test]
    fn test_empty_command_is_launch_failure() {
        let outcome = execute_task("   ", &OutputSinks::discard());
        assert_eq!(
            outcome,
            TaskOutcome::Failed(FailureReason::Launch("empty command".to_string()))
        );
    }

    #[test]
    fn test_extra_whitespace_between_arguments() {
        let outcome = execute_task("  echo   spaced   out  ", &OutputSinks::discard());
        assert_eq!(outcome, TaskOutcome::Succeeded);
    }

    #[test]
    fn test_stdout_appended_to_file() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("stdout.log");
        let sinks = OutputSinks {
            stdout: Sink::append_to(&log_path).unwrap(),
            stderr: Sink::Discard,
        };

        execute_task("echo first", &sinks);
        execute_task("echo second", &sinks);

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "first\nsecond\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_death_is_failure() {
        let outcome = execute_task("sh -c kill$IFS-9$IFS$$", &OutputSinks::discard());
        assert_eq!(outcome, TaskOutcome::Failed(FailureReason::Signaled));
    }
}
