use crate::status::check::{AdminFailure, PollResult, StatusCheck, classify};

use models::{ServerStatus, TaskEvent};

const ALL_PREVIOUS: [ServerStatus; 5] = ServerStatus::ALL;

fn auth_rejected() -> PollResult {
    PollResult::failed(AdminFailure::AuthRejected(TaskEvent::AuthFailedHttp))
}

fn command_failed() -> PollResult {
    PollResult::failed(AdminFailure::Failed(String::from("503 Service Unavailable")))
}

#[test]
fn given_closed_port_when_classified_then_offline_whatever_came_before() {
    for previous in ALL_PREVIOUS {
        assert_eq!(
            classify(previous, &PollResult::closed(), None, true),
            ServerStatus::Offline,
            "previous {previous}"
        );
    }
}

#[test]
fn given_matching_version_when_classified_then_online() {
    let polled = PollResult::answered("Payara Server 6.2024.6");

    assert_eq!(
        classify(ServerStatus::Offline, &polled, Some("6.2024.6"), false),
        ServerStatus::Online
    );
    assert_eq!(
        classify(ServerStatus::Unknown, &polled, None, false),
        ServerStatus::Online
    );
}

/// **VALUE**: Verifies that a foreign server on our admin port is reported OFFLINE.
///
/// **WHY THIS MATTERS**: Reporting it ONLINE would let a start "succeed" against the
/// wrong server and a stop shut down somebody else's domain.
#[test]
fn given_mismatching_version_when_classified_then_offline() {
    // GIVEN: A 5.x server answering where 6.x is expected
    let polled = PollResult::answered("Payara Server 5.2022.5");

    // WHEN/THEN: Even a previously online instance is now offline
    assert_eq!(
        classify(ServerStatus::Online, &polled, Some("6.2024.6"), true),
        ServerStatus::Offline
    );
}

/// **VALUE**: Verifies the rejected-credentials rule.
///
/// **WHY THIS MATTERS**: A server that refuses our login can only be assumed to be ours if
/// something already suggested so; otherwise it is an unverified occupant.
#[test]
fn given_rejected_credentials_when_classified_then_depends_on_evidence() {
    let polled = auth_rejected();

    for previous in [ServerStatus::Online, ServerStatus::Startup, ServerStatus::Shutdown] {
        assert_eq!(classify(previous, &polled, None, false), ServerStatus::Online);
    }
    assert_eq!(
        classify(ServerStatus::Offline, &polled, None, true),
        ServerStatus::Online
    );
    assert_eq!(
        classify(ServerStatus::Offline, &polled, None, false),
        ServerStatus::Offline
    );
    assert_eq!(
        classify(ServerStatus::Unknown, &polled, None, false),
        ServerStatus::Offline
    );
}

#[test]
fn given_failed_command_when_previously_up_then_shutdown() {
    let polled = command_failed();

    assert_eq!(
        classify(ServerStatus::Online, &polled, None, false),
        ServerStatus::Shutdown
    );
    assert_eq!(
        classify(ServerStatus::Shutdown, &polled, None, false),
        ServerStatus::Shutdown
    );
}

#[test]
fn given_failed_command_when_starting_or_process_alive_then_startup() {
    let polled = command_failed();

    assert_eq!(
        classify(ServerStatus::Startup, &polled, None, false),
        ServerStatus::Startup
    );
    assert_eq!(
        classify(ServerStatus::Offline, &polled, None, true),
        ServerStatus::Startup
    );
    assert_eq!(
        classify(ServerStatus::Unknown, &polled, None, true),
        ServerStatus::Startup
    );
}

#[test]
fn given_failed_command_without_evidence_then_offline() {
    let polled = PollResult::failed(AdminFailure::Unreachable(String::from("reset")));

    assert_eq!(
        classify(ServerStatus::Offline, &polled, None, false),
        ServerStatus::Offline
    );
    assert_eq!(
        classify(ServerStatus::Unknown, &polled, None, false),
        ServerStatus::Offline
    );
}

#[test]
fn given_poll_result_when_check_built_then_carries_version_and_message() {
    let answered = StatusCheck::new(ServerStatus::Online, &PollResult::answered("6.2024.6"));
    assert_eq!(answered.version.as_deref(), Some("6.2024.6"));
    assert!(answered.port_open);

    let closed = StatusCheck::new(ServerStatus::Offline, &PollResult::closed());
    assert_eq!(closed.version, None);
    assert!(!closed.port_open);
    assert_eq!(closed.message, "admin port closed");

    let rejected = StatusCheck::new(ServerStatus::Online, &auth_rejected());
    assert!(rejected.message.contains("AUTH_FAILED_HTTP"));
}
