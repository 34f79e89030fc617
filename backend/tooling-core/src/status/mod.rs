//! Status polling of registered instances.
//!
//! Every monitored instance gets one poll task that queries the admin port,
//! classifies the result and hands it to the registered listeners.

pub mod check;
pub mod listener;

use crate::admin::ServerAdmin;
use crate::config::StatusConfig;
use crate::error::status::StatusError;
use crate::registry::Instance;

use check::{StatusCheck, classify, query_server};
use listener::{ListenerId, Registration, StateStatusListener, StatusListener, due_listeners};

use common::ErrorLocation;

use models::ServerStatus;

use std::collections::{HashMap, HashSet};
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

struct Monitored {
    instance: Arc<Instance>,
    status: watch::Sender<ServerStatus>,
    listeners: Mutex<Vec<Registration>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Monitored {
    fn listeners(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, check: &StatusCheck) {
        let due = due_listeners(&mut self.listeners(), check.status);
        for listener in due {
            listener.current_state(self.instance.name(), check);
        }
    }
}

pub struct StatusMonitor {
    admin: Arc<dyn ServerAdmin>,
    config: StatusConfig,
    monitored: Mutex<HashMap<String, Arc<Monitored>>>,
}

impl StatusMonitor {
    pub fn new(admin: Arc<dyn ServerAdmin>, config: StatusConfig) -> Self {
        Self {
            admin,
            config,
            monitored: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Monitored>>> {
        self.monitored.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    fn entry(&self, instance: &str) -> Result<Arc<Monitored>, StatusError> {
        self.lock()
            .get(instance)
            .cloned()
            .ok_or_else(|| StatusError::NotMonitored {
                instance: instance.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    pub fn is_monitored(&self, instance: &str) -> bool {
        self.lock().contains_key(instance)
    }

    /// Start polling `instance` unless it is already polled, then wait up to
    /// the settle timeout for the first classification.
    ///
    /// Polling starts with a listener that keeps the instance state in line
    /// with the poll results.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Monitoring`] if the instance descriptor cannot be
    /// built.
    pub async fn monitor(&self, instance: &Arc<Instance>) -> Result<ServerStatus, StatusError> {
        let entry = {
            let mut monitored = self.lock();
            match monitored.get(instance.name()) {
                Some(entry) => Arc::clone(entry),
                None => {
                    instance.descriptor().map_err(|e| StatusError::Monitoring {
                        message: format!("Cannot monitor '{}': {e}", instance.name()),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                    let (status, _) = watch::channel(ServerStatus::Unknown);
                    let state_listener = Registration {
                        id: ListenerId::new(),
                        listener: Arc::new(StateStatusListener::new(Arc::clone(instance))),
                        remove_on_match: false,
                        statuses: ServerStatus::ALL.into_iter().collect(),
                    };
                    let entry = Arc::new(Monitored {
                        instance: Arc::clone(instance),
                        status,
                        listeners: Mutex::new(vec![state_listener]),
                        task: Mutex::new(None),
                    });

                    let handle = tokio::spawn(poll_loop(
                        Arc::clone(&entry),
                        Arc::clone(&self.admin),
                        self.config.clone(),
                    ));
                    *entry.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

                    monitored.insert(instance.name().to_string(), Arc::clone(&entry));
                    info!("Monitoring instance '{}'", instance.name());
                    entry
                }
            }
        };

        Ok(wait_known(&entry, self.config.monitor_settle()).await)
    }

    /// Register `listener` for the given statuses.
    ///
    /// With `remove_on_match` the listener fires at most once.
    pub fn add_listener(
        &self,
        instance: &str,
        listener: Arc<dyn StatusListener>,
        remove_on_match: bool,
        statuses: &[ServerStatus],
    ) -> Result<ListenerId, StatusError> {
        let entry = self.entry(instance)?;
        let id = ListenerId::new();
        entry.listeners().push(Registration {
            id,
            listener,
            remove_on_match,
            statuses: statuses.iter().copied().collect::<HashSet<_>>(),
        });
        trace!("Added status listener {id} to '{instance}' for {statuses:?}");
        Ok(id)
    }

    /// Returns whether the listener was still registered.
    pub fn remove_listener(&self, instance: &str, id: ListenerId) -> bool {
        let Ok(entry) = self.entry(instance) else {
            return false;
        };
        let mut listeners = entry.listeners();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        before != listeners.len()
    }

    pub fn listener_count(&self, instance: &str) -> usize {
        self.entry(instance)
            .map(|entry| entry.listeners().len())
            .unwrap_or_default()
    }

    /// Latest classification; `Unknown` when the instance is not polled.
    pub fn status(&self, instance: &str) -> ServerStatus {
        self.entry(instance)
            .map(|entry| *entry.status.borrow())
            .unwrap_or_default()
    }

    /// Wait while the status is `Unknown`, up to `wait`.
    pub async fn get_status(&self, instance: &str, wait: Duration) -> Result<ServerStatus, StatusError> {
        let entry = self.entry(instance)?;
        Ok(wait_known(&entry, wait).await)
    }

    pub fn subscribe(&self, instance: &str) -> Result<watch::Receiver<ServerStatus>, StatusError> {
        Ok(self.entry(instance)?.status.subscribe())
    }

    /// Stop polling `instance` and drop its listeners.
    pub fn unmonitor(&self, instance: &str) -> bool {
        let Some(entry) = self.lock().remove(instance) else {
            return false;
        };
        stop_entry(&entry);
        info!("Stopped monitoring instance '{instance}'");
        true
    }

    pub fn shutdown(&self) {
        let entries = self.lock().drain().map(|(_, entry)| entry).collect::<Vec<_>>();
        for entry in entries {
            stop_entry(&entry);
        }
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn stop_entry(entry: &Monitored) {
    if let Some(handle) = entry.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
        handle.abort();
    }
    entry.listeners().clear();
}

async fn wait_known(entry: &Monitored, wait: Duration) -> ServerStatus {
    let mut rx = entry.status.subscribe();
    match timeout(wait, rx.wait_for(|status| *status != ServerStatus::Unknown)).await {
        Ok(Ok(status)) => *status,
        Ok(Err(_)) | Err(_) => {
            debug!(
                "Status of '{}' still unknown after {wait:?}",
                entry.instance.name()
            );
            *entry.status.borrow()
        }
    }
}

async fn poll_loop(entry: Arc<Monitored>, admin: Arc<dyn ServerAdmin>, config: StatusConfig) {
    let name = entry.instance.name().to_string();
    debug!("Poll task for '{name}' started");

    loop {
        match entry.instance.descriptor() {
            Ok(descriptor) => {
                let result = query_server(&descriptor, admin.as_ref(), config.connect_timeout()).await;
                let previous = *entry.status.borrow();
                let status = classify(
                    previous,
                    &result,
                    descriptor.version.as_deref(),
                    entry.instance.process_alive(),
                );

                if status != previous {
                    debug!("Instance '{name}' status {previous} -> {status}");
                }
                entry.status.send_replace(status);
                entry.dispatch(&StatusCheck::new(status, &result));
            }
            Err(e) => warn!("Poll of '{name}' skipped: {e}"),
        }

        sleep(config.poll_interval()).await;
    }
}
