//! Task state definitions for tracking crawl progress
//!
//! A task starts `Pending`, becomes `InFlight` once it holds a worker slot,
//! and ends either `Done` or `Failed`. Both terminal states count towards the
//! phase barrier.

use std::fmt;

/// Represents the current state of one fetch+extract task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Target is known but its task has not been launched
    Pending,

    /// Task has been launched and holds a worker slot
    InFlight,

    /// Task fetched and extracted its page successfully
    Done,

    /// Task reported a network or storage failure
    Failed,
}

impl TaskState {
    /// Returns true if the task has reported completion
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InFlight)
                | (Self::InFlight, Self::Done)
                | (Self::InFlight, Self::Failed)
        )
    }

    /// Converts the state to its lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Done.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::InFlight.is_terminal());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(TaskState::Pending.can_transition_to(TaskState::InFlight));
        assert!(TaskState::InFlight.can_transition_to(TaskState::Done));
        assert!(TaskState::InFlight.can_transition_to(TaskState::Failed));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!TaskState::Pending.can_transition_to(TaskState::Done));
        assert!(!TaskState::Done.can_transition_to(TaskState::InFlight));
        assert!(!TaskState::Failed.can_transition_to(TaskState::Done));
        assert!(!TaskState::InFlight.can_transition_to(TaskState::Pending));
    }

    #[test]
    fn test_display() {
        assert_eq!(TaskState::InFlight.to_string(), "in_flight");
        assert_eq!(format!("{}", TaskState::Done), "done");
    }
}
