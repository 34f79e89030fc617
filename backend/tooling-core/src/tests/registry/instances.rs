use super::{changes, descriptor, secrets};

use crate::error::registry::RegistryError;
use crate::registry::InstanceRegistry;
use crate::registry::store::InstanceStore;

use models::ServerState;

use std::sync::Arc;

#[test]
fn given_registered_name_when_registered_again_then_duplicate_error() {
    let registry = InstanceRegistry::new(secrets(), changes());
    registry.register(descriptor("payara6")).unwrap();

    let result = registry.register(descriptor("payara6"));

    assert!(matches!(result, Err(RegistryError::Duplicate { ref name, .. }) if name == "payara6"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn given_unknown_name_when_required_then_not_found() {
    let registry = InstanceRegistry::new(secrets(), changes());

    assert!(matches!(
        registry.require("ghost"),
        Err(RegistryError::NotFound { .. })
    ));
    assert!(registry.remove("ghost").is_err());
}

/// **VALUE**: Verifies unregistering also forgets the stored password.
///
/// **BUG THIS CATCHES**: Would catch credentials of deleted servers lingering in the
/// keyring and being picked up by a later instance with the same name.
#[test]
fn given_registered_instance_when_removed_then_password_forgotten() {
    // GIVEN: A registered instance with a password
    let store = secrets();
    let registry = InstanceRegistry::new(store.clone(), changes());
    registry.register(descriptor("payara6")).unwrap();
    assert_eq!(store.len(), 1);

    // WHEN: It is removed
    registry.remove("payara6").unwrap();

    // THEN: The registry and secret store are both empty
    assert!(registry.is_empty());
    assert!(store.is_empty());
}

#[test]
fn given_registered_instance_when_state_set_then_change_broadcast() {
    let sender = changes();
    let mut rx = sender.subscribe();
    let registry = InstanceRegistry::new(secrets(), sender);
    let instance = registry.register(descriptor("payara6")).unwrap();

    instance.set_state(ServerState::Running);
    instance.set_state(ServerState::Running);

    let change = rx.try_recv().unwrap();
    assert_eq!(change.instance, "payara6");
    assert_eq!(change.old, ServerState::Unknown);
    assert_eq!(change.new, ServerState::Running);
    assert!(rx.try_recv().is_err());
}

#[test]
fn given_wrong_expected_state_when_compare_and_set_then_unchanged() {
    let registry = InstanceRegistry::new(secrets(), changes());
    let instance = registry.register(descriptor("payara6")).unwrap();

    let swapped = instance
        .state_holder()
        .compare_and_set(ServerState::Starting, ServerState::Running);

    assert!(!swapped);
    assert_eq!(instance.state(), ServerState::Unknown);
}

/// **VALUE**: Verifies a successful compare-and-set updates the state and broadcasts
/// exactly like a plain set, with or without subscribers.
///
/// **BUG THIS CATCHES**: Would catch the two update paths drifting apart, such as a
/// swap that stores the state but never notifies listeners.
#[test]
fn given_expected_state_when_compare_and_set_then_swapped_and_broadcast_once() {
    // GIVEN: An instance with no subscribers yet
    let sender = changes();
    let registry = InstanceRegistry::new(secrets(), sender.clone());
    let instance = registry.register(descriptor("payara6")).unwrap();
    let holder = instance.state_holder();

    // WHEN: Swapping without anyone listening
    let swapped = holder.compare_and_set(ServerState::Unknown, ServerState::Starting);

    // THEN: The state changes anyway
    assert!(swapped);
    assert_eq!(instance.state(), ServerState::Starting);

    // WHEN: Swapping again with a subscriber, then repeating the same state
    let mut rx = sender.subscribe();
    assert!(holder.compare_and_set(ServerState::Starting, ServerState::Running));
    assert!(holder.compare_and_set(ServerState::Running, ServerState::Running));

    // THEN: Only the real transition is broadcast
    let change = rx.try_recv().unwrap();
    assert_eq!(change.instance, "payara6");
    assert_eq!(change.old, ServerState::Starting);
    assert_eq!(change.new, ServerState::Running);
    assert!(rx.try_recv().is_err());
}

/// **VALUE**: Verifies a saved registry loads back into an equal registry.
///
/// **WHY THIS MATTERS**: The CLI is a fresh process per command; everything it knows
/// about servers comes from this file.
#[test]
fn given_saved_registry_when_loaded_into_new_registry_then_descriptors_restored() {
    // GIVEN: A registry with two instances saved to disk, sharing a secret store
    let dir = tempfile::tempdir().unwrap();
    let store = InstanceStore::in_dir(dir.path());
    let shared_secrets = secrets();
    let registry = InstanceRegistry::new(shared_secrets.clone(), changes());
    registry.register(descriptor("payara5")).unwrap();
    registry.register(descriptor("payara6")).unwrap();
    registry.save(&store).unwrap();

    // WHEN: Loading into a new registry
    let restored = InstanceRegistry::new(shared_secrets, changes());
    let loaded = restored.load(&store).unwrap();

    // THEN: Both come back with their passwords from the secret store
    assert_eq!(loaded, 2);
    let original = registry.require("payara6").unwrap().descriptor().unwrap();
    let reloaded = restored.require("payara6").unwrap().descriptor().unwrap();
    assert_eq!(original, reloaded);
    assert!(!std::fs::read_to_string(store.path()).unwrap().contains("s3cret"));
}

#[test]
fn given_store_with_broken_entry_when_loaded_then_entry_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = InstanceStore::in_dir(dir.path());
    std::fs::write(
        store.path(),
        "[[instance]]\ndisplayName = \"good\"\n\n[[instance]]\ndisplayName = \"bad\"\nadminPort = \"not-a-port\"\n\n[[instance]]\ndisplayName = \"good\"\n",
    )
    .unwrap();

    let registry = InstanceRegistry::new(secrets(), changes());
    let loaded = registry.load(&store).unwrap();

    assert_eq!(loaded, 1);
    assert!(registry.get("good").is_some());
    assert!(registry.get("bad").is_none());
}

#[test]
fn given_registry_when_listed_then_ordered_by_name() {
    let registry = InstanceRegistry::new(secrets(), changes());
    registry.register(descriptor("zeta")).unwrap();
    registry.register(descriptor("alpha")).unwrap();

    let names = registry
        .list()
        .iter()
        .map(|instance| instance.name().to_string())
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["alpha", "zeta"]);
    assert!(Arc::ptr_eq(
        &registry.get("alpha").unwrap(),
        &registry.list()[0]
    ));
}
