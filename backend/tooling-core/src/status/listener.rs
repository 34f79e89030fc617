use crate::registry::Instance;
use crate::status::check::StatusCheck;

use models::{ServerState, ServerStatus};

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::{Arc, Mutex, PoisonError};

use log::trace;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Receives poll results for one monitored instance.
///
/// Called on the poll task; implementations must return quickly.
pub trait StatusListener: Send + Sync {
    fn current_state(&self, instance: &str, check: &StatusCheck);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ListenerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct Registration {
    pub id: ListenerId,
    pub listener: Arc<dyn StatusListener>,
    pub remove_on_match: bool,
    pub statuses: HashSet<ServerStatus>,
}

impl Registration {
    pub fn matches(&self, status: ServerStatus) -> bool {
        self.statuses.contains(&status)
    }
}

/// Take the listeners due for `status` out of `registrations`.
///
/// One-shot registrations that match are removed from the list here, before
/// any of them is invoked.
pub(crate) fn due_listeners(
    registrations: &mut Vec<Registration>,
    status: ServerStatus,
) -> Vec<Arc<dyn StatusListener>> {
    let mut due = Vec::new();
    registrations.retain(|registration| {
        if !registration.matches(status) {
            return true;
        }
        due.push(Arc::clone(&registration.listener));
        !registration.remove_on_match
    });
    due
}

// ============================================
// ONE-SHOT WAITER
// ============================================

/// One-shot listener that hands the first matching check to a waiting task.
pub struct StatusWaiter {
    sender: Mutex<Option<oneshot::Sender<StatusCheck>>>,
}

impl StatusWaiter {
    pub fn new() -> (Arc<Self>, oneshot::Receiver<StatusCheck>) {
        let (tx, rx) = oneshot::channel();
        (
            Arc::new(Self {
                sender: Mutex::new(Some(tx)),
            }),
            rx,
        )
    }
}

impl StatusListener for StatusWaiter {
    fn current_state(&self, instance: &str, check: &StatusCheck) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sender) = sender
            && sender.send(check.clone()).is_err()
        {
            trace!("Waiter for '{instance}' dropped before {} arrived", check.status);
        }
    }
}

// ============================================
// STATE LISTENER
// ============================================

/// Moves the instance state along with poll results.
///
/// While a lifecycle command is in flight only the status that settles it is
/// applied; the lifecycle listener owns the other transitions.
pub struct StateStatusListener {
    instance: Arc<Instance>,
}

impl StateStatusListener {
    pub fn new(instance: Arc<Instance>) -> Self {
        Self { instance }
    }
}

pub(crate) fn next_state(current: ServerState, status: ServerStatus) -> Option<ServerState> {
    let next = match (current, status) {
        (_, ServerStatus::Unknown) => return None,
        (ServerState::Starting, ServerStatus::Online) => ServerState::Running,
        (ServerState::Starting, _) => return None,
        (ServerState::Stopping, ServerStatus::Offline) => ServerState::Stopped,
        (ServerState::Stopping, _) => return None,
        (ServerState::StoppedJvmProfiler, ServerStatus::Online) => ServerState::Running,
        (ServerState::StoppedJvmProfiler, _) => return None,
        (_, status) => ServerState::from(status),
    };
    (next != current).then_some(next)
}

impl StatusListener for StateStatusListener {
    fn current_state(&self, _instance: &str, check: &StatusCheck) {
        let current = self.instance.state();
        if let Some(next) = next_state(current, check.status) {
            self.instance.state_holder().compare_and_set(current, next);
        }
    }
}
