use crate::error::registry::RegistryError;

use common::{ErrorLocation, RedactedPassword};

use models::server_instance::keys::{DOMAINS_FOLDER_ATTR, IMPORT_FIXED_ATTR, PASSWORD_ATTR};
use models::server_instance::OLD_DEFAULT_ADMIN_PASSWORD;

use std::collections::BTreeMap;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const INSTANCES_FILE_NAME: &str = "instances.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    instance: Vec<BTreeMap<String, String>>,
}

/// One descriptor read back from disk.
#[derive(Debug)]
pub struct StoredInstance {
    pub properties: BTreeMap<String, String>,
    /// Password found in a legacy file; belongs in the secret store.
    pub legacy_password: Option<RedactedPassword>,
}

/// TOML file of instance property tables (`[[instance]]`). Passwords are
/// never written to it.
#[derive(Debug, Clone)]
pub struct InstanceStore {
    path: PathBuf,
}

impl InstanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(INSTANCES_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[track_caller]
    fn store_error(&self, reason: impl Into<String>) -> RegistryError {
        RegistryError::Store {
            path: self.path.clone(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Read all descriptors. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<StoredInstance>, RegistryError> {
        if !self.path.exists() {
            debug!("No instance store at {}", self.path.display());
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| self.store_error(format!("read failed: {e}")))?;
        let file: StoreFile =
            toml::from_str(&contents).map_err(|e| self.store_error(format!("parse failed: {e}")))?;

        let instances = file
            .instance
            .into_iter()
            .map(|mut properties| {
                fix_imported_attributes(&mut properties);
                let legacy_password = properties
                    .remove(PASSWORD_ATTR)
                    .map(RedactedPassword::new);
                StoredInstance {
                    properties,
                    legacy_password,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "Loaded {} instance(s) from {}",
            instances.len(),
            self.path.display()
        );
        Ok(instances)
    }

    /// Write all descriptors atomically (temp file + rename).
    pub fn save<I>(&self, instances: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = BTreeMap<String, String>>,
    {
        let file = StoreFile {
            instance: instances
                .into_iter()
                .map(|mut props| {
                    props.remove(PASSWORD_ATTR);
                    props
                })
                .collect(),
        };

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .map_err(|e| self.store_error(format!("create directory failed: {e}")))?;
        }

        let contents =
            toml::to_string(&file).map_err(|e| self.store_error(format!("serialize failed: {e}")))?;

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        std::fs::write(&temp_path, contents)
            .map_err(|e| self.store_error(format!("write failed: {e}")))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| self.store_error(format!("rename failed: {e}")))?;

        info!(
            "Saved {} instance(s) to {}",
            file.instance.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Descriptors written by old tooling stored the local default password
/// `adminadmin`; current domains default to an empty one. Runs once per
/// descriptor, tracked by the `importFixed` marker.
pub(crate) fn fix_imported_attributes(properties: &mut BTreeMap<String, String>) {
    if properties.contains_key(IMPORT_FIXED_ATTR) {
        return;
    }

    let local = properties.contains_key(DOMAINS_FOLDER_ATTR);
    if local
        && properties.get(PASSWORD_ATTR).map(String::as_str) == Some(OLD_DEFAULT_ADMIN_PASSWORD)
    {
        debug!("Replacing legacy default admin password");
        // The current default is empty, which is the same as no password at all.
        properties.remove(PASSWORD_ATTR);
    }

    properties.insert(IMPORT_FIXED_ATTR.to_string(), true.to_string());
}
