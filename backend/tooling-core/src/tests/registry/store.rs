use crate::registry::store::{InstanceStore, fix_imported_attributes};

use models::server_instance::keys::{
    DISPLAY_NAME_ATTR, DOMAINS_FOLDER_ATTR, IMPORT_FIXED_ATTR, PASSWORD_ATTR,
};

use std::collections::BTreeMap;

fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// **VALUE**: Verifies the legacy `adminadmin` default is dropped for local domains.
///
/// **WHY THIS MATTERS**: Domains created by current releases have an empty default
/// password; sending the old one makes every admin command fail authentication.
#[test]
fn given_local_descriptor_with_legacy_password_when_fixed_then_password_removed() {
    // GIVEN: A local descriptor never fixed before
    let mut properties = props(&[
        (DISPLAY_NAME_ATTR, "payara"),
        (DOMAINS_FOLDER_ATTR, "/opt/payara/glassfish/domains"),
        (PASSWORD_ATTR, "adminadmin"),
    ]);

    // WHEN: Fixing
    fix_imported_attributes(&mut properties);

    // THEN: Password gone, marker set
    assert!(!properties.contains_key(PASSWORD_ATTR));
    assert_eq!(properties.get(IMPORT_FIXED_ATTR).map(String::as_str), Some("true"));
}

#[test]
fn given_remote_descriptor_with_legacy_password_when_fixed_then_password_kept() {
    let mut properties = props(&[(DISPLAY_NAME_ATTR, "remote"), (PASSWORD_ATTR, "adminadmin")]);

    fix_imported_attributes(&mut properties);

    assert_eq!(properties.get(PASSWORD_ATTR).map(String::as_str), Some("adminadmin"));
    assert!(properties.contains_key(IMPORT_FIXED_ATTR));
}

#[test]
fn given_already_fixed_descriptor_when_fixed_again_then_untouched() {
    let mut properties = props(&[
        (DOMAINS_FOLDER_ATTR, "/opt/payara/glassfish/domains"),
        (PASSWORD_ATTR, "adminadmin"),
        (IMPORT_FIXED_ATTR, "true"),
    ]);
    let before = properties.clone();

    fix_imported_attributes(&mut properties);

    assert_eq!(properties, before);
}

#[test]
fn given_missing_file_when_loaded_then_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = InstanceStore::in_dir(dir.path());

    assert!(store.load().unwrap().is_empty());
}

#[test]
fn given_file_with_password_when_loaded_then_password_split_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = InstanceStore::in_dir(dir.path());
    std::fs::write(
        store.path(),
        "[[instance]]\ndisplayName = \"remote\"\npassword = \"pw\"\n",
    )
    .unwrap();

    let loaded = store.load().unwrap();

    assert_eq!(loaded.len(), 1);
    assert!(!loaded[0].properties.contains_key(PASSWORD_ATTR));
    assert_eq!(
        loaded[0].legacy_password.as_ref().map(|p| p.expose()),
        Some("pw")
    );
}

#[test]
fn given_properties_with_password_when_saved_then_file_has_no_password() {
    let dir = tempfile::tempdir().unwrap();
    let store = InstanceStore::new(dir.path().join("nested").join("instances.toml"));

    store
        .save([props(&[(DISPLAY_NAME_ATTR, "payara"), (PASSWORD_ATTR, "pw")])])
        .unwrap();

    let contents = std::fs::read_to_string(store.path()).unwrap();
    assert!(contents.contains("[[instance]]"));
    assert!(contents.contains("payara"));
    assert!(!contents.contains("pw\""));
}

#[test]
fn given_corrupt_file_when_loaded_then_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = InstanceStore::in_dir(dir.path());
    std::fs::write(store.path(), "[[instance]\nbroken").unwrap();

    assert!(store.load().is_err());
}
