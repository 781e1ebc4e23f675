//! Service registry: key → controller instance resolution with caching.
//!
//! The registry turns a logical key (the controller or task name extracted
//! from a route) into a concrete instance under one of three provisioning
//! modes:
//!
//! - **Service list** (default): keys map explicitly to a registered
//!   factory class, optionally gated on a file that must exist before
//!   instantiation.
//! - **Namespaces**: the key is tried under each configured namespace
//!   prefix, first loadable class wins.
//! - **Folders**: each configured folder is searched recursively for a
//!   file named after the key; the first hit gates instantiation.
//!
//! Class names never reach a runtime loader: instantiation goes through
//! factory closures registered at startup (see
//! [`crate::controller::service_factory`]), which preserves the
//! "resolve by string key" contract without reflection.
//!
//! Successful resolutions are memoized per key; re-registering a key
//! invalidates its cache slot so the next resolution builds a fresh
//! instance.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::controller::{ServiceFactory, SharedController};

/// File extension used when searching folders for a service by key.
pub const SERVICE_FILE_EXTENSION: &str = ".rs";

/// How the registry locates a class for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningMode {
    /// Resolve keys against the explicit service list (default).
    ServiceList,
    /// Scan the configured namespace prefixes.
    Namespaces,
    /// Scan the configured folder trees.
    Folders,
}

impl Default for ProvisioningMode {
    fn default() -> Self {
        ProvisioningMode::ServiceList
    }
}

/// An explicit service-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEntry {
    /// A factory class name, loadable as registered.
    Class(String),
    /// A factory class name plus a file that must exist before the class
    /// is instantiated (the explicit load step).
    ClassInFile {
        /// The factory class name.
        class: String,
        /// The file whose presence gates instantiation.
        file: PathBuf,
    },
}

/// A failure to resolve a key into an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No service-list entry exists for the key.
    NotRegistered {
        /// The key that was looked up.
        key: String,
    },
    /// An entry named a class with no registered factory.
    UnknownClass {
        /// The class name with no factory.
        class: String,
    },
    /// A `{class, file}` entry pointed at a missing file.
    MissingFile {
        /// The class whose load step failed.
        class: String,
        /// The missing file.
        file: PathBuf,
    },
    /// The key was not found under any configured namespace.
    NamespacesExhausted {
        /// The key that was looked up.
        key: String,
    },
    /// The key was not found under any configured folder.
    FoldersExhausted {
        /// The key that was looked up.
        key: String,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotRegistered { key } => {
                write!(f, "no service is registered for key '{}'", key)
            }
            ResolveError::UnknownClass { class } => {
                write!(f, "no factory is registered for class '{}'", class)
            }
            ResolveError::MissingFile { class, file } => {
                write!(
                    f,
                    "service class '{}' requires missing file '{}'",
                    class,
                    file.display()
                )
            }
            ResolveError::NamespacesExhausted { key } => {
                write!(
                    f,
                    "controller class '{}' was not found in any listed namespace",
                    key
                )
            }
            ResolveError::FoldersExhausted { key } => {
                write!(
                    f,
                    "controller class '{}' was not found in any listed folder",
                    key
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// The key → instance resolution and caching layer handed to each handler.
#[derive(Default)]
pub struct ServiceRegistry {
    factories: HashMap<String, ServiceFactory>,
    services: HashMap<String, ServiceEntry>,
    namespaces: Vec<String>,
    folders: Vec<PathBuf>,
    mode: ProvisioningMode,
    cache: HashMap<String, SharedController>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("mode", &self.mode)
            .field("factories", &self.factories.len())
            .field("services", &self.services.len())
            .field("namespaces", &self.namespaces)
            .field("folders", &self.folders)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl ServiceRegistry {
    /// An empty registry in service-list mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a class name. Namespace-mode factories
    /// are keyed by their fully-qualified `"prefix::Class"` name.
    pub fn register_factory(&mut self, class: impl Into<String>, factory: ServiceFactory) {
        self.factories.insert(class.into(), factory);
    }

    /// Map a key to a service-list entry, invalidating any cached instance
    /// for that key.
    pub fn register(&mut self, key: impl Into<String>, entry: ServiceEntry) {
        let key = key.into();
        self.cache.remove(&key);
        self.services.insert(key, entry);
    }

    /// Switch to namespace provisioning with the given prefix list.
    pub fn set_namespaces(&mut self, namespaces: Vec<String>) {
        self.namespaces = namespaces;
        self.mode = ProvisioningMode::Namespaces;
    }

    /// Switch to folder provisioning with the given folder list.
    pub fn set_folders(&mut self, folders: Vec<PathBuf>) {
        self.folders = folders;
        self.mode = ProvisioningMode::Folders;
    }

    /// The active provisioning mode.
    #[must_use]
    pub fn mode(&self) -> ProvisioningMode {
        self.mode
    }

    /// True if the key is resolvable under the active mode, without
    /// instantiating anything.
    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        match self.mode {
            ProvisioningMode::ServiceList => self.services.contains_key(key),
            ProvisioningMode::Namespaces => self
                .namespaces
                .iter()
                .any(|ns| self.factories.contains_key(&format!("{}::{}", ns, key))),
            ProvisioningMode::Folders => {
                self.factories.contains_key(key)
                    && self
                        .folders
                        .iter()
                        .any(|folder| find_file_recursively(folder, &service_file_name(key)).is_some())
            }
        }
    }

    /// Resolve a key into a controller instance.
    ///
    /// With `use_cache` set, repeated resolutions of the same key return
    /// the identical instance until the key's mapping is reassigned.
    /// Passing `use_cache = false` builds a fresh instance and leaves the
    /// cache slot untouched.
    pub fn resolve(
        &mut self,
        key: &str,
        use_cache: bool,
    ) -> Result<SharedController, ResolveError> {
        if use_cache {
            if let Some(instance) = self.cache.get(key) {
                debug!(key = %key, "service resolved from instance cache");
                return Ok(Rc::clone(instance));
            }
        }

        let instance = match self.mode {
            ProvisioningMode::ServiceList => self.instance_from_services(key)?,
            ProvisioningMode::Namespaces => self.instance_from_namespaces(key)?,
            ProvisioningMode::Folders => self.instance_from_folders(key)?,
        };

        if use_cache {
            self.cache.insert(key.to_string(), Rc::clone(&instance));
        }
        debug!(key = %key, mode = ?self.mode, use_cache, "service resolved");
        Ok(instance)
    }

    fn instance_from_services(&self, key: &str) -> Result<SharedController, ResolveError> {
        let entry = self
            .services
            .get(key)
            .ok_or_else(|| ResolveError::NotRegistered {
                key: key.to_string(),
            })?;
        match entry {
            ServiceEntry::Class(class) => self.instantiate(class),
            ServiceEntry::ClassInFile { class, file } => {
                if !file.exists() {
                    return Err(ResolveError::MissingFile {
                        class: class.clone(),
                        file: file.clone(),
                    });
                }
                self.instantiate(class)
            }
        }
    }

    fn instance_from_namespaces(&self, key: &str) -> Result<SharedController, ResolveError> {
        for namespace in &self.namespaces {
            let full_class = format!("{}::{}", namespace, key);
            if let Some(factory) = self.factories.get(&full_class) {
                debug!(key = %key, class = %full_class, "service found under namespace");
                return Ok(factory());
            }
        }
        Err(ResolveError::NamespacesExhausted {
            key: key.to_string(),
        })
    }

    fn instance_from_folders(&self, key: &str) -> Result<SharedController, ResolveError> {
        let file_name = service_file_name(key);
        for folder in &self.folders {
            if let Some(path) = find_file_recursively(folder, &file_name) {
                debug!(key = %key, path = %path.display(), "service file found under folder");
                return self.instantiate(key);
            }
        }
        Err(ResolveError::FoldersExhausted {
            key: key.to_string(),
        })
    }

    fn instantiate(&self, class: &str) -> Result<SharedController, ResolveError> {
        self.factories
            .get(class)
            .map(|factory| factory())
            .ok_or_else(|| ResolveError::UnknownClass {
                class: class.to_string(),
            })
    }
}

fn service_file_name(key: &str) -> String {
    format!("{}{}", key, SERVICE_FILE_EXTENSION)
}

/// Depth-first, case-insensitive search for a file name under a folder.
///
/// Directory entries are visited in sorted order so the first match is
/// deterministic; the recursive walk is otherwise the slow path and is
/// only taken under folder provisioning.
fn find_file_recursively(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(dir).ok()?.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().eq_ignore_ascii_case(file_name) {
            return Some(path);
        }
        if path.is_dir() {
            if let Some(found) = find_file_recursively(&path, file_name) {
                return Some(found);
            }
        }
    }
    None
}
