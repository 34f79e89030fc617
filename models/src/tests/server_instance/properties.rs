use crate::server_instance::host_from_url;
use crate::server_instance::keys::{
    ADMINPORT_ATTR, DISPLAY_NAME_ATTR, HTTPPORT_ATTR, JVM_MODE_ATTR, PASSWORD_ATTR,
};
use crate::{JvmMode, ModelError, ServerInstance, ServerInstanceBuilder};

use common::RedactedPassword;

use std::collections::BTreeMap;

/// **VALUE**: A descriptor written to the instance store must come back identical,
/// otherwise every restart of the tool silently changes a user's configuration.
#[test]
fn given_full_descriptor_when_flattened_and_restored_then_matches() {
    // GIVEN: A descriptor touching every optional field
    let original = ServerInstanceBuilder::default()
        .with_name("full")
        .with_host("db-host")
        .with_http_port(28080)
        .with_admin_port(24848)
        .with_admin_user("root")
        .with_admin_password(RedactedPassword::new("pw"))
        .with_server_root("/opt/payara6")
        .with_server_home("/opt/payara6/glassfish")
        .with_domains_dir("/opt/payara6/glassfish/domains")
        .with_domain_name("production")
        .with_java_home("/usr/lib/jvm/java-21")
        .with_jvm_mode(JvmMode::Debug)
        .with_jvm_args(["-Xmx2g".to_string(), "-Dfoo=bar".to_string()])
        .with_debug_port(9999)
        .with_version("6.2024.5")
        .with_target("server")
        .build()
        .unwrap();

    // WHEN: Converting to properties and back, handing the password separately
    let props = original.to_properties();
    let restored =
        ServerInstance::from_properties(&props, original.admin_password.clone()).unwrap();

    // THEN: Nothing is lost and the password never appears in the map
    assert_eq!(restored, original);
    assert!(!props.contains_key(PASSWORD_ATTR));
}

#[test]
fn given_minimal_properties_when_restored_then_defaults_fill_in() {
    let mut props = BTreeMap::new();
    props.insert(DISPLAY_NAME_ATTR.to_string(), "minimal".to_string());

    let instance = ServerInstance::from_properties(&props, None).unwrap();

    assert_eq!(instance.admin_port, 4848);
    assert_eq!(instance.http_port, 8080);
    assert!(instance.admin_password.is_none());
}

#[test]
fn given_garbage_port_when_restored_then_returns_property_error() {
    let mut props = BTreeMap::new();
    props.insert(DISPLAY_NAME_ATTR.to_string(), "broken".to_string());
    props.insert(ADMINPORT_ATTR.to_string(), "forty-eight".to_string());

    let result = ServerInstance::from_properties(&props, None);

    match result {
        Err(ModelError::Property { key, value, .. }) => {
            assert_eq!(key, ADMINPORT_ATTR);
            assert_eq!(value, "forty-eight");
        }
        other => panic!("expected property error, got {other:?}"),
    }
}

#[test]
fn given_unknown_jvm_mode_when_restored_then_returns_property_error() {
    let mut props = BTreeMap::new();
    props.insert(DISPLAY_NAME_ATTR.to_string(), "mode".to_string());
    props.insert(HTTPPORT_ATTR.to_string(), "8080".to_string());
    props.insert(JVM_MODE_ATTR.to_string(), "turbo".to_string());

    assert!(ServerInstance::from_properties(&props, None).is_err());
}

#[test]
fn given_deployer_urls_when_host_extracted_then_handles_malformed_input() {
    assert_eq!(
        host_from_url("[/opt/p]deployer:pfv4ee8:example.org:4848"),
        Some("example.org".to_string())
    );
    assert_eq!(host_from_url("deployer:pfv4ee8:example.org:4848"), None);
    assert_eq!(host_from_url("[/opt/p]deployer:pfv4ee8"), None);
}
