use crate::registry::secret::{SecretStore, password_key};

use common::RedactedPassword;

use models::server_instance::keys::{DISPLAY_NAME_ATTR, PASSWORD_ATTR, USERNAME_ATTR};
use models::server_instance::DEFAULT_ADMIN_NAME;
use models::{ModelError, ServerInstance};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Property map of one registered instance.
///
/// The password never sits in the map: reads and writes of the `password`
/// key go to the [`SecretStore`] under the key derived from the current
/// display name and user name.
pub struct InstanceProps {
    values: Mutex<BTreeMap<String, String>>,
    secrets: Arc<dyn SecretStore>,
}

impl InstanceProps {
    pub fn new(mut values: BTreeMap<String, String>, secrets: Arc<dyn SecretStore>) -> Self {
        let stray = values.remove(PASSWORD_ATTR);
        let props = Self {
            values: Mutex::new(values),
            secrets,
        };
        if let Some(password) = stray {
            props.set_password(RedactedPassword::new(password));
        }
        props
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn secret_key(&self) -> String {
        let values = self.lock();
        let server = values.get(DISPLAY_NAME_ATTR).map(String::as_str).unwrap_or_default();
        let user = values
            .get(USERNAME_ATTR)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ADMIN_NAME);
        password_key(server, user)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if key == PASSWORD_ATTR {
            return self.password().map(|p| p.expose().to_string());
        }
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: impl Into<String>) {
        if key == PASSWORD_ATTR {
            self.set_password(RedactedPassword::new(value));
            return;
        }
        self.lock().insert(key.to_string(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        if key == PASSWORD_ATTR {
            let previous = self.password();
            self.forget_password();
            return previous.map(|p| p.expose().to_string());
        }
        self.lock().remove(key)
    }

    pub fn password(&self) -> Option<RedactedPassword> {
        self.secrets.get(&self.secret_key())
    }

    pub fn set_password(&self, password: RedactedPassword) {
        self.secrets.put(&self.secret_key(), password);
    }

    pub fn forget_password(&self) {
        self.secrets.remove(&self.secret_key());
    }

    /// Copy of the persisted properties; never includes the password.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn descriptor(&self) -> Result<ServerInstance, ModelError> {
        let values = self.snapshot();
        ServerInstance::from_properties(&values, self.password())
    }
}
