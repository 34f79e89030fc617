use crate::server_instance::{
    DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PORT, DEFAULT_DEBUG_PORT, DEFAULT_DOMAIN_NAME,
    DEFAULT_HTTP_PORT,
};
use crate::{JvmMode, ModelError, ServerInstanceBuilder};

use std::path::PathBuf;

/// **VALUE**: Verifies that a descriptor needs nothing but a name to describe a
/// freshly created local domain.
///
/// **BUG THIS CATCHES**: Would catch defaults drifting away from what `asadmin
/// create-domain` produces (admin 4848, http 8080, user admin, domain1).
#[test]
fn given_only_name_when_building_then_applies_domain_defaults() {
    // GIVEN: Builder with just a name
    let builder = ServerInstanceBuilder::default().with_name("payara6");

    // WHEN: Building
    let instance = builder.build().expect("defaults should be valid");

    // THEN: Defaults match a fresh domain
    assert_eq!(instance.host, "localhost");
    assert_eq!(instance.http_port, DEFAULT_HTTP_PORT);
    assert_eq!(instance.admin_port, DEFAULT_ADMIN_PORT);
    assert_eq!(instance.admin_user, DEFAULT_ADMIN_NAME);
    assert_eq!(instance.domain_name, DEFAULT_DOMAIN_NAME);
    assert_eq!(instance.jvm_mode, JvmMode::Normal);
    assert!(instance.is_remote(), "no domains folder means remote");
}

#[test]
fn given_missing_name_when_building_then_returns_validation_error() {
    let result = ServerInstanceBuilder::default().with_admin_port(4848).build();

    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Instance name is required");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn given_blank_name_when_building_then_returns_validation_error() {
    let result = ServerInstanceBuilder::default().with_name("   ").build();

    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

/// **VALUE**: The status poller and the HTTP listener cannot share a port.
#[test]
fn given_same_http_and_admin_port_when_building_then_returns_validation_error() {
    let result = ServerInstanceBuilder::default()
        .with_name("clash")
        .with_http_port(4848)
        .with_admin_port(4848)
        .build();

    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

#[test]
fn given_zero_admin_port_when_building_then_returns_validation_error() {
    let result = ServerInstanceBuilder::default()
        .with_name("zero")
        .with_admin_port(0)
        .build();

    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

/// **VALUE**: Privileged debug ports are silently replaced with 9009, matching
/// how stored descriptors with bad debug ports are repaired instead of rejected.
#[cfg(not(windows))]
#[test]
fn given_privileged_debug_port_when_building_then_falls_back_to_default() {
    let instance = ServerInstanceBuilder::default()
        .with_name("debug")
        .with_debug_port(80)
        .build()
        .unwrap();

    assert_eq!(instance.debug_port, DEFAULT_DEBUG_PORT);
}

#[test]
fn given_deployer_url_without_host_when_building_then_host_comes_from_url() {
    let instance = ServerInstanceBuilder::default()
        .with_name("from-url")
        .with_url("[/opt/payara6]deployer:pfv6ee10:build-box:4848")
        .build()
        .unwrap();

    assert_eq!(instance.host, "build-box");
}

#[test]
fn given_local_domain_when_building_then_paths_are_derived() {
    let instance = ServerInstanceBuilder::default()
        .with_name("local")
        .with_domains_dir("/opt/payara6/glassfish/domains")
        .with_domain_name("dev")
        .build()
        .unwrap();

    assert!(!instance.is_remote());
    assert_eq!(
        instance.server_log_path(),
        Some(PathBuf::from("/opt/payara6/glassfish/domains/dev/logs/server.log"))
    );
    assert_eq!(instance.admin_base_url(), "http://localhost:4848");
}

#[test]
fn given_wsl_instance_with_domains_when_checked_then_is_remote() {
    let instance = ServerInstanceBuilder::default()
        .with_name("wsl")
        .with_domains_dir("/mnt/c/payara/domains")
        .with_wsl(true)
        .build()
        .unwrap();

    assert!(instance.is_remote());
}
