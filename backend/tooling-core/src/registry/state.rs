use models::{ServerState, StateChange};

use std::sync::{Mutex, PoisonError};

use log::{debug, trace};
use tokio::sync::broadcast;

/// The one authoritative [`ServerState`] of an instance.
///
/// Updates happen under the lock; the [`StateChange`] is broadcast after the
/// lock is released so subscribers can read the state back without blocking.
pub struct StateHolder {
    instance: String,
    state: Mutex<ServerState>,
    changes: broadcast::Sender<StateChange>,
}

impl StateHolder {
    pub fn new(instance: impl Into<String>, changes: broadcast::Sender<StateChange>) -> Self {
        Self {
            instance: instance.into(),
            state: Mutex::new(ServerState::Unknown),
            changes,
        }
    }

    pub fn get(&self) -> ServerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the state and return the previous one. Unchanged states are not broadcast.
    pub fn set(&self, new: ServerState) -> ServerState {
        let old = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, new)
        };

        if old != new {
            self.publish(old, new);
        }
        old
    }

    /// Set `new` only while the current state is `expected`.
    pub fn compare_and_set(&self, expected: ServerState, new: ServerState) -> bool {
        let swapped = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == expected {
                *state = new;
                true
            } else {
                false
            }
        };

        if swapped && expected != new {
            self.publish(expected, new);
        }
        swapped
    }

    fn publish(&self, old: ServerState, new: ServerState) {
        debug!("Instance '{}' state {old} -> {new}", self.instance);
        let change = StateChange {
            instance: self.instance.clone(),
            old,
            new,
        };
        if self.changes.send(change).is_err() {
            trace!("No state subscribers for '{}'", self.instance);
        }
    }
}
