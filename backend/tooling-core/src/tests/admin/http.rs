use crate::admin::http::{AdminResponse, HttpServerAdmin, interpret};
use crate::admin::{AdminCommand, AdminTarget};

use common::RedactedPassword;

use models::{TaskEvent, TaskState};

fn target(secure: bool) -> AdminTarget {
    AdminTarget {
        host: String::from("localhost"),
        admin_port: 4848,
        secure,
        user: String::from("admin"),
        password: RedactedPassword::new(""),
    }
}

#[test]
fn given_plain_target_when_command_url_built_then_points_at_asadmin_endpoint() {
    // GIVEN: A plain HTTP admin listener
    let target = target(false);

    // WHEN: Building the URL of stop-domain
    let url = HttpServerAdmin::command_url(&target, AdminCommand::StopDomain).unwrap();

    // THEN: The command hangs below __asadmin
    assert_eq!(url.as_str(), "http://localhost:4848/__asadmin/stop-domain");
}

#[test]
fn given_secure_target_when_command_url_built_then_uses_https() {
    let url = HttpServerAdmin::command_url(&target(true), AdminCommand::Version).unwrap();
    assert_eq!(url.scheme(), "https");
}

/// **VALUE**: Verifies that a successful answer carries the message and flattened properties.
///
/// **WHY THIS MATTERS**: The version check reads the version from the message; the
/// `__locations` command returns its data as extra properties.
#[test]
fn given_success_response_when_interpreted_then_completed_with_properties() {
    // GIVEN: A SUCCESS body with one string and one numeric property
    let response: AdminResponse = serde_json::from_str(
        r#"{"message":" Payara Server 6.2024.6 ","exit_code":"SUCCESS",
            "extraProperties":{"Domain-Root":"/opt/payara/domains/domain1","Pid":42}}"#,
    )
    .unwrap();

    // WHEN: Interpreting it
    let result = interpret(AdminCommand::Version, response);

    // THEN: Completed, trimmed message, properties as strings
    assert_eq!(result.state, TaskState::Completed);
    assert_eq!(result.message, "Payara Server 6.2024.6");
    assert_eq!(
        result.properties.get("Domain-Root").map(String::as_str),
        Some("/opt/payara/domains/domain1")
    );
    assert_eq!(result.properties.get("Pid").map(String::as_str), Some("42"));
    assert!(result.auth_failure.is_none());
}

#[test]
fn given_failure_response_mentioning_authentication_when_interpreted_then_auth_failed() {
    // GIVEN: A FAILURE body about credentials
    let response: AdminResponse = serde_json::from_str(
        r#"{"message":"Remote server does not listen for requests... Authentication failed","exit_code":"FAILURE"}"#,
    )
    .unwrap();

    // WHEN: Interpreting it
    let result = interpret(AdminCommand::StopDomain, response);

    // THEN: Failed with AUTH_FAILED
    assert_eq!(result.state, TaskState::Failed);
    assert_eq!(result.auth_failure, Some(TaskEvent::AuthFailed));
}

#[test]
fn given_plain_failure_response_when_interpreted_then_failed_without_auth_event() {
    let response: AdminResponse =
        serde_json::from_str(r#"{"message":"Command stop-domain failed.","exit_code":"FAILURE"}"#)
            .unwrap();

    let result = interpret(AdminCommand::StopDomain, response);

    assert_eq!(result.state, TaskState::Failed);
    assert!(result.auth_failure.is_none());
    assert!(!result.unreachable);
}

#[test]
fn given_body_without_fields_when_deserialized_then_defaults_apply() {
    let response: AdminResponse = serde_json::from_str("{}").unwrap();
    let result = interpret(AdminCommand::Version, response);
    assert_eq!(result.state, TaskState::Failed);
}
