//! Property keys of a persisted instance descriptor.

pub const DISPLAY_NAME_ATTR: &str = "displayName";
pub const HOSTNAME_ATTR: &str = "host";
pub const HTTPPORT_ATTR: &str = "httpPort";
pub const ADMINPORT_ATTR: &str = "adminPort";
pub const ADMIN_SECURE_ATTR: &str = "adminSecure";
pub const USERNAME_ATTR: &str = "username";
pub const PASSWORD_ATTR: &str = "password";
pub const INSTALL_FOLDER_ATTR: &str = "installRoot";
pub const PAYARA_FOLDER_ATTR: &str = "homeFolder";
pub const DOMAINS_FOLDER_ATTR: &str = "domainsFolder";
pub const DOMAIN_NAME_ATTR: &str = "domainName";
pub const WSL_ATTR: &str = "wsl";
pub const DOCKER_ATTR: &str = "docker";
pub const TARGET_ATTR: &str = "target";
pub const URL_ATTR: &str = "url";
pub const JAVA_HOME_ATTR: &str = "javaHome";
pub const JVM_MODE_ATTR: &str = "jvmMode";
pub const JVM_ARGS_ATTR: &str = "jvmArgs";
pub const DEBUG_PORT_ATTR: &str = "debugPort";
pub const VERSION_ATTR: &str = "version";
/// Marks descriptors whose legacy default password was already migrated.
pub const IMPORT_FIXED_ATTR: &str = "importFixed";
