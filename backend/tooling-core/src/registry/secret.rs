use common::RedactedPassword;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

const KEYRING_NAME_SPACE: &str = "Payara.admin";

/// Persistent home of admin passwords, kept apart from instance descriptors.
pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Option<RedactedPassword>;
    fn put(&self, key: &str, secret: RedactedPassword);
    fn remove(&self, key: &str);
}

/// Key of the admin password of `user` on server `server`:
/// `Payara.admin.password:<server>:<user>`.
pub fn password_key(server: &str, user: &str) -> String {
    format!(
        "{KEYRING_NAME_SPACE}.{}:{server}:{user}",
        models::server_instance::keys::PASSWORD_ATTR
    )
}

/// In-process [`SecretStore`]; secrets are lost when the process exits.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, RedactedPassword>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.secrets.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Option<RedactedPassword> {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, secret: RedactedPassword) {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), secret);
    }

    fn remove(&self, key: &str) {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
