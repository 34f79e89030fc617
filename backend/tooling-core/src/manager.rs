//! Process-scoped owner of every tooling component.

use crate::admin::ServerAdmin;
use crate::admin::http::HttpServerAdmin;
use crate::config::ToolingConfig;
use crate::error::CoreError;
use crate::error::log_view::LogViewError;
use crate::lifecycle::task::{Operation, TaskContext, TaskListener};
use crate::lifecycle::{LifecycleExecutor, TaskHandle};
use crate::log_view::LogViewManager;
use crate::log_view::pipeline::{ForwardingSink, LogSink};
use crate::process::launch::{JvmLauncher, ProcessLauncher};
use crate::registry::secret::{MemorySecretStore, SecretStore};
use crate::registry::store::InstanceStore;
use crate::registry::{Instance, InstanceRegistry};
use crate::status::StatusMonitor;

use common::ErrorLocation;

use models::{ServerInstance, ServerState, ServerStatus, StateChange};

use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::broadcast;

const STATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
pub struct ToolingManagerBuilder {
    config: ToolingConfig,
    admin: Option<Arc<dyn ServerAdmin>>,
    launcher: Option<Arc<dyn ProcessLauncher>>,
    secrets: Option<Arc<dyn SecretStore>>,
    sink: Option<Arc<dyn LogSink>>,
    store: Option<InstanceStore>,
}

impl ToolingManagerBuilder {
    pub fn with_config(mut self, config: ToolingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_admin(mut self, admin: Arc<dyn ServerAdmin>) -> Self {
        self.admin = Some(admin);
        self
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn ProcessLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Persist instances in `store`; its content is loaded by [`Self::build`].
    pub fn with_store(mut self, store: InstanceStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<ToolingManager, CoreError> {
        self.config.validate()?;

        let admin = match self.admin {
            Some(admin) => admin,
            None => Arc::new(HttpServerAdmin::new(self.config.status.admin_timeout())?),
        };
        let launcher = self.launcher.unwrap_or_else(|| Arc::new(JvmLauncher));
        let secrets = self
            .secrets
            .unwrap_or_else(|| Arc::new(MemorySecretStore::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(ForwardingSink));

        let (changes, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        let registry = InstanceRegistry::new(secrets, changes.clone());
        if let Some(store) = &self.store {
            let loaded = registry.load(store)?;
            debug!("Loaded {loaded} instance(s) from {}", store.path().display());
        }

        Ok(ToolingManager {
            monitor: Arc::new(StatusMonitor::new(
                Arc::clone(&admin),
                self.config.status.clone(),
            )),
            executor: LifecycleExecutor::new(self.config.lifecycle.worker_pool_size),
            log_views: Arc::new(LogViewManager::new(sink, &self.config.log)),
            registry,
            admin,
            launcher,
            changes,
            store: self.store,
            config: self.config,
        })
    }
}

pub struct ToolingManager {
    config: ToolingConfig,
    registry: InstanceRegistry,
    monitor: Arc<StatusMonitor>,
    executor: LifecycleExecutor,
    log_views: Arc<LogViewManager>,
    admin: Arc<dyn ServerAdmin>,
    launcher: Arc<dyn ProcessLauncher>,
    changes: broadcast::Sender<StateChange>,
    store: Option<InstanceStore>,
}

impl ToolingManager {
    pub fn builder() -> ToolingManagerBuilder {
        ToolingManagerBuilder::default()
    }

    pub fn config(&self) -> &ToolingConfig {
        &self.config
    }

    pub fn monitor(&self) -> &Arc<StatusMonitor> {
        &self.monitor
    }

    pub fn log_views(&self) -> &Arc<LogViewManager> {
        &self.log_views
    }

    fn persist(&self) -> Result<(), CoreError> {
        if let Some(store) = &self.store {
            self.registry.save(store)?;
        }
        Ok(())
    }

    // ============================================
    // REGISTRY
    // ============================================

    pub fn register(&self, descriptor: ServerInstance) -> Result<Arc<Instance>, CoreError> {
        let instance = self.registry.register(descriptor)?;
        self.persist()?;
        Ok(instance)
    }

    /// Remove an instance after stopping its poller and log readers.
    pub fn unregister(&self, name: &str) -> Result<Arc<Instance>, CoreError> {
        let instance = self.registry.require(name)?;
        self.monitor.unmonitor(name);
        self.log_views.stop(name);
        if let Some(start) = instance.take_start_task() {
            start.abort();
        }

        let removed = self.registry.remove(name)?;
        self.persist()?;
        Ok(removed)
    }

    pub fn instance(&self, name: &str) -> Option<Arc<Instance>> {
        self.registry.get(name)
    }

    pub fn instances(&self) -> Vec<Arc<Instance>> {
        self.registry.list()
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    fn context(
        &self,
        operation: Operation,
        instance: Arc<Instance>,
        listeners: &[Arc<dyn TaskListener>],
    ) -> TaskContext {
        listeners.iter().fold(
            TaskContext::new(
                operation,
                instance,
                Arc::clone(&self.monitor),
                Arc::clone(&self.admin),
                Arc::clone(&self.launcher),
                Arc::clone(&self.log_views),
                self.config.lifecycle.clone(),
                self.config.status.connect_timeout(),
            ),
            |ctx, listener| ctx.with_listener(Arc::clone(listener)),
        )
    }

    fn submit(
        &self,
        operation: Operation,
        name: &str,
        listeners: &[Arc<dyn TaskListener>],
    ) -> Result<TaskHandle, CoreError> {
        let instance = self.registry.require(name)?;
        let handle = self
            .executor
            .run(self.context(operation, Arc::clone(&instance), listeners));

        if matches!(operation, Operation::Start | Operation::Restart) {
            instance.set_start_task(handle.abort_handle());
        }
        info!("Submitted {operation} of '{name}'");
        Ok(handle)
    }

    pub fn start(&self, name: &str, listeners: &[Arc<dyn TaskListener>]) -> Result<TaskHandle, CoreError> {
        self.submit(Operation::Start, name, listeners)
    }

    pub fn stop(&self, name: &str, listeners: &[Arc<dyn TaskListener>]) -> Result<TaskHandle, CoreError> {
        self.submit(Operation::Stop, name, listeners)
    }

    pub fn restart(&self, name: &str, listeners: &[Arc<dyn TaskListener>]) -> Result<TaskHandle, CoreError> {
        self.submit(Operation::Restart, name, listeners)
    }

    pub fn kill(&self, name: &str, listeners: &[Arc<dyn TaskListener>]) -> Result<TaskHandle, CoreError> {
        self.submit(Operation::Kill, name, listeners)
    }

    // ============================================
    // STATUS & STATE
    // ============================================

    /// Poll status of `name`, starting its poller if needed.
    pub async fn status(&self, name: &str) -> Result<ServerStatus, CoreError> {
        let instance = self.registry.require(name)?;
        Ok(self.monitor.monitor(&instance).await?)
    }

    pub fn state(&self, name: &str) -> Result<ServerState, CoreError> {
        Ok(self.registry.require(name)?.state())
    }

    pub fn subscribe_state(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    // ============================================
    // LOGS
    // ============================================

    fn server_log_path(&self, name: &str) -> Result<PathBuf, CoreError> {
        let descriptor = self.registry.require(name)?.descriptor()?;
        let path = descriptor
            .server_log_path()
            .ok_or_else(|| LogViewError::Source {
                message: format!("Instance '{name}' has no local domain folder"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        Ok(path)
    }

    /// Tail `<domains>/<domain>/logs/server.log` of a local instance.
    pub fn follow_server_log(&self, name: &str, from_start: bool) -> Result<usize, CoreError> {
        let path = self.server_log_path(name)?;
        Ok(self.log_views.follow_file(name, path, from_start))
    }

    /// Render the current `server.log` of a local instance once.
    pub async fn read_server_log(&self, name: &str) -> Result<usize, CoreError> {
        let path = self.server_log_path(name)?;
        Ok(self.log_views.read_file(name, path).await?)
    }

    /// Stop every poller, reader and pending task.
    pub fn shutdown(&self) {
        info!("Shutting down tooling manager");
        self.executor.shutdown();
        self.monitor.shutdown();
        self.log_views.stop_all();
        for instance in self.registry.list() {
            if let Some(start) = instance.take_start_task() {
                start.abort();
            }
        }
    }
}
