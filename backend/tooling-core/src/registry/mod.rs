//! Registered server instances and their persistence.

pub mod props;
pub mod secret;
pub mod state;
pub mod store;

use crate::error::registry::RegistryError;
use crate::process::ServerProcess;

use common::ErrorLocation;

use models::{ServerInstance, ServerState, StateChange};

use props::InstanceProps;
use secret::SecretStore;
use state::StateHolder;
use store::InstanceStore;

use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

// ============================================
// INSTANCE
// ============================================

/// Runtime handle of one registered instance.
pub struct Instance {
    name: String,
    props: InstanceProps,
    state: StateHolder,
    process: Mutex<Option<Arc<ServerProcess>>>,
    start_task: Mutex<Option<AbortHandle>>,
}

impl Instance {
    pub fn new(name: impl Into<String>, props: InstanceProps, changes: broadcast::Sender<StateChange>) -> Self {
        let name = name.into();
        Self {
            state: StateHolder::new(name.clone(), changes),
            name,
            props,
            process: Mutex::new(None),
            start_task: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &InstanceProps {
        &self.props
    }

    /// Current descriptor built from the properties and the stored password.
    pub fn descriptor(&self) -> Result<ServerInstance, RegistryError> {
        Ok(self.props.descriptor()?)
    }

    pub fn state(&self) -> ServerState {
        self.state.get()
    }

    pub fn state_holder(&self) -> &StateHolder {
        &self.state
    }

    pub fn set_state(&self, state: ServerState) -> ServerState {
        self.state.set(state)
    }

    pub fn process(&self) -> Option<Arc<ServerProcess>> {
        self.process.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_process(&self, process: Arc<ServerProcess>) {
        *self.process.lock().unwrap_or_else(PoisonError::into_inner) = Some(process);
    }

    pub fn take_process(&self) -> Option<Arc<ServerProcess>> {
        self.process.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Whether a tracked local process is alive.
    pub fn process_alive(&self) -> bool {
        self.process().is_some_and(|p| p.is_running())
    }

    pub fn set_start_task(&self, handle: AbortHandle) {
        *self.start_task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    pub fn take_start_task(&self) -> Option<AbortHandle> {
        self.start_task.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

// ============================================
// REGISTRY
// ============================================

/// Owned map of registered instances, keyed by display name.
pub struct InstanceRegistry {
    instances: Mutex<BTreeMap<String, Arc<Instance>>>,
    secrets: Arc<dyn SecretStore>,
    changes: broadcast::Sender<StateChange>,
}

impl InstanceRegistry {
    pub fn new(secrets: Arc<dyn SecretStore>, changes: broadcast::Sender<StateChange>) -> Self {
        Self {
            instances: Mutex::new(BTreeMap::new()),
            secrets,
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Arc<Instance>>> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new instance. Its password, if any, goes to the secret store.
    pub fn register(&self, descriptor: ServerInstance) -> Result<Arc<Instance>, RegistryError> {
        let name = descriptor.name.clone();
        let mut instances = self.lock();

        if instances.contains_key(&name) {
            return Err(RegistryError::Duplicate {
                name,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let props = InstanceProps::new(descriptor.to_properties(), Arc::clone(&self.secrets));
        if let Some(password) = descriptor.admin_password.clone() {
            props.set_password(password);
        }

        let instance = Arc::new(Instance::new(name.clone(), props, self.changes.clone()));
        instances.insert(name.clone(), Arc::clone(&instance));

        info!("Registered instance '{name}'");
        Ok(instance)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Instance>> {
        self.lock().get(name).cloned()
    }

    #[track_caller]
    pub fn require(&self, name: &str) -> Result<Arc<Instance>, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    pub fn list(&self) -> Vec<Arc<Instance>> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove an instance and its stored password.
    pub fn remove(&self, name: &str) -> Result<Arc<Instance>, RegistryError> {
        let removed = self.lock().remove(name);
        let instance = removed.ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        instance.props().forget_password();
        info!("Removed instance '{name}'");
        Ok(instance)
    }

    /// Register every valid descriptor in `store`. Broken or duplicate entries
    /// are logged and skipped; returns how many were registered.
    pub fn load(&self, store: &InstanceStore) -> Result<usize, RegistryError> {
        let mut loaded = 0;

        for stored in store.load()? {
            let props = InstanceProps::new(stored.properties, Arc::clone(&self.secrets));
            if let Some(password) = stored.legacy_password {
                props.set_password(password);
            }

            let descriptor = match props.descriptor() {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    warn!("Skipping invalid instance in {}: {e}", store.path().display());
                    continue;
                }
            };

            let name = descriptor.name.clone();
            let mut instances = self.lock();
            if instances.contains_key(&name) {
                warn!("Skipping duplicate instance '{name}' in {}", store.path().display());
                continue;
            }
            instances.insert(
                name.clone(),
                Arc::new(Instance::new(name, props, self.changes.clone())),
            );
            loaded += 1;
        }

        Ok(loaded)
    }

    pub fn save(&self, store: &InstanceStore) -> Result<(), RegistryError> {
        let snapshots = self
            .list()
            .iter()
            .map(|instance| instance.props().snapshot())
            .collect::<Vec<_>>();
        store.save(snapshots)
    }
}
