use super::secrets;

use crate::registry::props::InstanceProps;
use crate::registry::secret::{SecretStore, password_key};

use common::RedactedPassword;

use models::server_instance::keys::{DISPLAY_NAME_ATTR, PASSWORD_ATTR, USERNAME_ATTR};

use std::collections::BTreeMap;

fn values(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(DISPLAY_NAME_ATTR.to_string(), name.to_string())])
}

#[test]
fn given_server_and_user_when_key_built_then_keyring_format() {
    assert_eq!(
        password_key("payara6", "admin"),
        "Payara.admin.password:payara6:admin"
    );
}

/// **VALUE**: Verifies the password property is routed to the secret store.
///
/// **WHY THIS MATTERS**: The property map is what gets persisted; a password that lands in
/// it ends up in plain text on disk.
#[test]
fn given_password_put_when_snapshot_taken_then_password_only_in_secret_store() {
    // GIVEN: Props for "payara6" with the default user
    let store = secrets();
    let props = InstanceProps::new(values("payara6"), store.clone());

    // WHEN: The password property is written
    props.put(PASSWORD_ATTR, "s3cret");

    // THEN: It can be read back but is not in the snapshot
    assert_eq!(props.get(PASSWORD_ATTR).as_deref(), Some("s3cret"));
    assert!(!props.snapshot().contains_key(PASSWORD_ATTR));
    assert_eq!(
        store
            .get("Payara.admin.password:payara6:admin")
            .map(|p| p.expose().to_string())
            .as_deref(),
        Some("s3cret")
    );
}

#[test]
fn given_stray_password_in_values_when_constructed_then_moved_to_secret_store() {
    let store = secrets();
    let mut initial = values("payara6");
    initial.insert(PASSWORD_ATTR.to_string(), String::from("legacy"));

    let props = InstanceProps::new(initial, store.clone());

    assert!(!props.snapshot().contains_key(PASSWORD_ATTR));
    assert_eq!(store.len(), 1);
    assert_eq!(props.password(), Some(RedactedPassword::new("legacy")));
}

#[test]
fn given_custom_user_when_password_set_then_key_uses_that_user() {
    let store = secrets();
    let mut initial = values("payara6");
    initial.insert(USERNAME_ATTR.to_string(), String::from("ops"));
    let props = InstanceProps::new(initial, store.clone());

    props.set_password(RedactedPassword::new("pw"));

    assert!(store.get("Payara.admin.password:payara6:ops").is_some());
    assert!(store.get("Payara.admin.password:payara6:admin").is_none());
}

#[test]
fn given_password_when_removed_then_secret_gone_and_previous_returned() {
    let store = secrets();
    let props = InstanceProps::new(values("payara6"), store.clone());
    props.set_password(RedactedPassword::new("pw"));

    let previous = props.remove(PASSWORD_ATTR);

    assert_eq!(previous.as_deref(), Some("pw"));
    assert!(store.is_empty());
    assert_eq!(props.password(), None);
}

#[test]
fn given_props_with_password_when_descriptor_built_then_password_attached() {
    let props = InstanceProps::new(values("payara6"), secrets());
    props.set_password(RedactedPassword::new("pw"));

    let descriptor = props.descriptor().unwrap();

    assert_eq!(descriptor.name, "payara6");
    assert_eq!(descriptor.admin_password, Some(RedactedPassword::new("pw")));
}
