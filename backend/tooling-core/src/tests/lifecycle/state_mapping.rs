use crate::lifecycle::task::{Operation, StateTaskListener};

use models::{ServerState, TaskEvent, TaskState};

#[test]
fn given_start_progress_when_mapped_then_starting_then_running() {
    assert_eq!(
        StateTaskListener::next_state(Operation::Start, TaskState::Running, TaskEvent::CmdRunning),
        Some(ServerState::Starting)
    );
    assert_eq!(
        StateTaskListener::next_state(Operation::Start, TaskState::Completed, TaskEvent::CmdCompleted),
        Some(ServerState::Running)
    );
}

/// **VALUE**: Verifies how a failed start is reflected in the instance state.
///
/// **WHY THIS MATTERS**: A start that failed because the JVM exited leaves a server that is
/// known to be down; any other failure leaves us without knowledge of the real state.
#[test]
fn given_failed_start_when_mapped_then_depends_on_cause() {
    for event in [TaskEvent::ProcessNotRunning, TaskEvent::CmdFailed] {
        assert_eq!(
            StateTaskListener::next_state(Operation::Start, TaskState::Failed, event),
            Some(ServerState::Stopped),
            "{event}"
        );
    }
    for event in [TaskEvent::IllegalState, TaskEvent::AuthFailed, TaskEvent::Exception] {
        assert_eq!(
            StateTaskListener::next_state(Operation::Start, TaskState::Failed, event),
            Some(ServerState::Unknown),
            "{event}"
        );
    }
}

#[test]
fn given_stop_like_operations_when_mapped_then_stopping_then_stopped() {
    for operation in [Operation::Stop, Operation::Restart, Operation::Kill] {
        assert_eq!(
            StateTaskListener::next_state(operation, TaskState::Running, TaskEvent::CmdRunning),
            Some(ServerState::Stopping)
        );
        assert_eq!(
            StateTaskListener::next_state(operation, TaskState::Completed, TaskEvent::CmdCompleted),
            Some(ServerState::Stopped)
        );
        assert_eq!(
            StateTaskListener::next_state(operation, TaskState::Failed, TaskEvent::CmdFailed),
            Some(ServerState::Unknown)
        );
    }
}
