//! Execution Timeline
//!
//! Tracks task start/end times for the end-of-run report. Events are
//! keyed by dispatch index, so a command listed twice is timed per run.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::events::{TaskEvent, TaskObserver};

/// Type of timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Task dispatched to a worker
    Started,
    /// Task exited successfully
    Completed,
    /// Task failed
    Failed,
}

/// A single event in the execution timeline.
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    /// Position of the task in the run
    pub index: usize,
    /// Command string of the task
    pub task: String,
    pub event_type: EventType,
    pub timestamp: Instant,
}

/// Run time of one finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTiming {
    pub index: usize,
    pub task: String,
    pub duration: Duration,
}

/// Records when each task starts and finishes.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTimeline {
    events: Vec<TimelineEvent>,
}

impl ExecutionTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event for the task at `index`.
    pub fn add_event(&mut self, index: usize, task: impl Into<String>, event_type: EventType) {
        self.events.push(TimelineEvent {
            index,
            task: task.into(),
            event_type,
            timestamp: Instant::now(),
        });
    }

    /// Returns the run time of every finished task, in finishing order.
    pub fn durations(&self) -> Vec<TaskTiming> {
        let mut starts: HashMap<usize, Instant> = HashMap::new();
        let mut timings = Vec::new();

        for event in &self.events {
            match event.event_type {
                EventType::Started => {
                    starts.insert(event.index, event.timestamp);
                }
                EventType::Completed | EventType::Failed => {
                    if let Some(start) = starts.remove(&event.index) {
                        timings.push(TaskTiming {
                            index: event.index,
                            task: event.task.clone(),
                            duration: event.timestamp.duration_since(start),
                        });
                    }
                }
            }
        }

        timings
    }

    /// Returns up to `limit` finished tasks, longest first.
    pub fn slowest(&self, limit: usize) -> Vec<TaskTiming> {
        let mut timings = self.durations();
        timings.sort_by(|a, b| b.duration.cmp(&a.duration).then_with(|| a.index.cmp(&b.index)));
        timings.truncate(limit);
        timings
    }
}

impl TaskObserver for ExecutionTimeline {
    fn on_event(&mut self, event: &TaskEvent<'_>) {
        let event_type = match event {
            TaskEvent::Started { .. } => EventType::Started,
            TaskEvent::Completed { .. } => EventType::Completed,
            TaskEvent::Failed { .. } => EventType::Failed,
        };
        self.add_event(event.index(), event.task(), event_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::events::FailureReason;
    use std::thread;

    #[test]
    fn test_timeline_creation() {
        let timeline = ExecutionTimeline::new();
        assert!(timeline.events.is_empty());
        assert!(timeline.durations().is_empty());
    }

    #[test]
    fn test_durations() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, "sleep 1", EventType::Started);
        thread::sleep(Duration::from_millis(50));
        timeline.add_event(0, "sleep 1", EventType::Completed);

        let durations = timeline.durations();
        assert_eq!(durations.len(), 1);
        assert_eq!(durations[0].task, "sleep 1");
        assert!(durations[0].duration >= Duration::from_millis(50));
    }

    #[test]
    fn test_durations_only_started() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, "task", EventType::Started);

        assert!(timeline.durations().is_empty());
    }

    #[test]
    fn test_failed_task_has_duration() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, "false", EventType::Started);
        timeline.add_event(0, "false", EventType::Failed);

        assert_eq!(timeline.durations()[0].task, "false");
    }

    #[test]
    fn test_identical_commands_timed_separately() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, "sleep 1", EventType::Started);
        thread::sleep(Duration::from_millis(40));
        timeline.add_event(1, "sleep 1", EventType::Started);
        timeline.add_event(1, "sleep 1", EventType::Completed);
        thread::sleep(Duration::from_millis(10));
        timeline.add_event(0, "sleep 1", EventType::Completed);

        let durations = timeline.durations();
        assert_eq!(durations.len(), 2);

        let first = durations.iter().find(|t| t.index == 0).unwrap();
        let second = durations.iter().find(|t| t.index == 1).unwrap();
        assert!(first.duration >= Duration::from_millis(50));
        assert!(second.duration < first.duration);
    }

    #[test]
    fn test_slowest_ordering() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, "fast", EventType::Started);
        timeline.add_event(1, "slow", EventType::Started);
        timeline.add_event(0, "fast", EventType::Completed);
        thread::sleep(Duration::from_millis(30));
        timeline.add_event(1, "slow", EventType::Completed);

        let slowest = timeline.slowest(1);
        assert_eq!(slowest.len(), 1);
        assert_eq!(slowest[0].task, "slow");
    }

    #[test]
    fn test_observer_records_events() {
        let mut timeline = ExecutionTimeline::new();
        let reason = FailureReason::ExitCode(1);

        timeline.on_event(&TaskEvent::Started { index: 3, task: "a" });
        timeline.on_event(&TaskEvent::Failed {
            index: 3,
            task: "a",
            reason: &reason,
        });

        assert_eq!(timeline.events.len(), 2);
        assert_eq!(timeline.events[1].event_type, EventType::Failed);
        assert_eq!(timeline.events[1].index, 3);

        let durations = timeline.durations();
        assert_eq!(durations[0].index, 3);
        assert_eq!(durations[0].task, "a");
    }
}
