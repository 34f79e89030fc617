use crate::helpers::closed_port;

use tooling_core::ADMIN_REQUESTED_BY;
use tooling_core::admin::http::HttpServerAdmin;
use tooling_core::admin::{AdminCommand, AdminTarget, ServerAdmin};

use common::RedactedPassword;

use models::{TaskEvent, TaskState};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target_for(port: u16) -> AdminTarget {
    AdminTarget {
        host: String::from("127.0.0.1"),
        admin_port: port,
        secure: false,
        user: String::from("admin"),
        password: RedactedPassword::new(""),
    }
}

fn admin() -> HttpServerAdmin {
    HttpServerAdmin::new(Duration::from_secs(2)).expect("client builds")
}

/// **VALUE**: Verifies the full request/response path of the `version` command.
///
/// **WHY THIS MATTERS**: Every status poll goes through this call; the headers are required
/// by the server's CSRF filter and the JSON shape is what the listener returns.
#[tokio::test]
async fn given_listener_reporting_version_when_exec_then_completed_with_version() {
    // GIVEN: A fake admin listener answering version
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__asadmin/version"))
        .and(header("X-Requested-By", ADMIN_REQUESTED_BY))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Payara Server  6.2024.6 #badassfish (build 123)\n",
            "exit_code": "SUCCESS",
            "extraProperties": { "version-number": "6.2024.6" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Executing version
    let result = admin()
        .exec(&target_for(server.address().port()), AdminCommand::Version)
        .await;

    // THEN: Completed with the trimmed message and the extra properties
    assert_eq!(result.state, TaskState::Completed);
    assert_eq!(result.message, "Payara Server  6.2024.6 #badassfish (build 123)");
    assert_eq!(
        result.properties.get("version-number").map(String::as_str),
        Some("6.2024.6")
    );
    assert!(!result.unreachable);
}

#[tokio::test]
async fn given_listener_rejecting_credentials_when_exec_then_auth_failed_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__asadmin/stop-domain"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = admin()
        .exec(&target_for(server.address().port()), AdminCommand::StopDomain)
        .await;

    assert_eq!(result.state, TaskState::Failed);
    assert_eq!(result.auth_failure, Some(TaskEvent::AuthFailedHttp));
}

#[tokio::test]
async fn given_forbidden_response_when_exec_then_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = admin()
        .exec(&target_for(server.address().port()), AdminCommand::Version)
        .await;

    assert_eq!(result.auth_failure, Some(TaskEvent::AuthFailed));
}

#[tokio::test]
async fn given_failure_exit_code_when_exec_then_failed_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Command stop-domain failed.",
            "exit_code": "FAILURE"
        })))
        .mount(&server)
        .await;

    let result = admin()
        .exec(&target_for(server.address().port()), AdminCommand::StopDomain)
        .await;

    assert_eq!(result.state, TaskState::Failed);
    assert_eq!(result.message, "Command stop-domain failed.");
    assert_eq!(result.auth_failure, None);
    assert!(!result.unreachable);
}

/// **VALUE**: Verifies a gateway answer is reported as a server that is not ready yet.
///
/// **WHY THIS MATTERS**: A DAS behind a proxy answers 502-504 while it boots or goes down;
/// the poller must keep it reachable so it classifies as STARTUP or SHUTDOWN.
#[tokio::test]
async fn given_transient_status_when_exec_then_failed_but_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("booting"))
        .mount(&server)
        .await;

    let result = admin()
        .exec(&target_for(server.address().port()), AdminCommand::Version)
        .await;

    assert_eq!(result.state, TaskState::Failed);
    assert!(!result.unreachable);
    assert!(result.auth_failure.is_none());
    assert!(result.message.contains("starting up or shutting down"), "{}", result.message);
}

#[tokio::test]
async fn given_internal_error_when_exec_then_failed_with_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = admin()
        .exec(&target_for(server.address().port()), AdminCommand::Version)
        .await;

    assert_eq!(result.state, TaskState::Failed);
    assert!(!result.unreachable);
    assert!(result.message.contains("boom"), "{}", result.message);
    assert!(!result.message.contains("starting up"), "{}", result.message);
}

/// **VALUE**: Verifies a dead port is reported as unreachable rather than as a failure.
///
/// **BUG THIS CATCHES**: Would catch the poller treating a stopped server like one that
/// answered with an error, which keeps it in SHUTDOWN instead of OFFLINE on the next tick.
#[tokio::test]
async fn given_nothing_listening_when_exec_then_unreachable() {
    // GIVEN: A port nobody listens on
    let port = closed_port();

    // WHEN: Executing version
    let result = admin().exec(&target_for(port), AdminCommand::Version).await;

    // THEN: Failed and flagged unreachable
    assert_eq!(result.state, TaskState::Failed);
    assert!(result.unreachable);
}
