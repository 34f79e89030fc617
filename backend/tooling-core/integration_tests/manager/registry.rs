use crate::helpers::{FakeAdmin, closed_port, fast_config, local_instance};

use tooling_core::manager::ToolingManager;
use tooling_core::registry::secret::MemorySecretStore;
use tooling_core::registry::store::InstanceStore;

use common::RedactedPassword;

use std::sync::Arc;

/// **VALUE**: Verifies registrations survive a new manager built on the same store.
///
/// **WHY THIS MATTERS**: Each CLI invocation builds its own manager; an instance added by
/// `add` must be there for the following `start`.
#[tokio::test]
async fn given_registered_instance_when_new_manager_built_then_instance_loaded() {
    // GIVEN: A manager persisting into a temp directory
    let config_dir = tempfile::tempdir().unwrap();
    let domains = tempfile::tempdir().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let first = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .with_secrets(secrets.clone())
        .with_store(InstanceStore::in_dir(config_dir.path()))
        .build()
        .unwrap();
    let mut descriptor = local_instance("payara6", domains.path(), closed_port());
    descriptor.admin_password = Some(RedactedPassword::new("s3cret"));
    first.register(descriptor.clone()).unwrap();
    first.shutdown();

    // WHEN: A second manager loads the same store
    let second = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .with_secrets(secrets)
        .with_store(InstanceStore::in_dir(config_dir.path()))
        .build()
        .unwrap();

    // THEN: The descriptor comes back, password included
    let loaded = second.instance("payara6").unwrap().descriptor().unwrap();
    assert_eq!(loaded, descriptor);
    second.shutdown();
}

#[tokio::test]
async fn given_registered_instance_when_unregistered_then_store_and_monitor_cleared() {
    let config_dir = tempfile::tempdir().unwrap();
    let domains = tempfile::tempdir().unwrap();
    let manager = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .with_store(InstanceStore::in_dir(config_dir.path()))
        .build()
        .unwrap();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    manager.status("payara6").await.unwrap();

    manager.unregister("payara6").unwrap();

    assert!(manager.instance("payara6").is_none());
    assert!(!manager.monitor().is_monitored("payara6"));
    let stored = InstanceStore::in_dir(config_dir.path()).load().unwrap();
    assert!(stored.is_empty());
    manager.shutdown();
}

#[tokio::test]
async fn given_duplicate_name_when_registered_then_error() {
    let domains = tempfile::tempdir().unwrap();
    let manager = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .build()
        .unwrap();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();

    assert!(
        manager
            .register(local_instance("payara6", domains.path(), closed_port()))
            .is_err()
    );
    assert_eq!(manager.instances().len(), 1);
}

#[test]
fn given_invalid_config_when_built_then_error() {
    let mut config = fast_config();
    config.lifecycle.worker_pool_size = 0;

    let result = ToolingManager::builder()
        .with_config(config)
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .build();

    assert!(result.is_err());
}
