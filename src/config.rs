//! Declarative router configuration.
//!
//! A router can be assembled from a YAML or JSON document listing its
//! handlers in dispatch order, each with its own service registry settings
//! and plugin list:
//!
//! ```yaml
//! handlers:
//!   - name: api
//!     class: RestHandler
//!     options:
//!       basePath: /api
//!       services:
//!         Users: UsersController
//!       plugins:
//!         - class: AccessControlPlugin
//!           options:
//!             realm: internal
//!   - name: web
//!     class: MvcHandler
//! ```
//!
//! Class names in the document are resolved through a [`FactorySet`]:
//! constructors registered at startup under the same string keys the
//! document uses. The three built-in handler classes are pre-registered;
//! application controllers and plugins are added with
//! [`FactorySet::register_service_class`] and
//! [`FactorySet::register_plugin_class`]. An unknown class name anywhere in
//! the document fails the whole build with
//! [`RouteError::Configuration`], before any request is served.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::controller::ServiceFactory;
use crate::dispatcher::Dispatcher;
use crate::errors::RouteError;
use crate::handler::cli::CliTaskHandler;
use crate::handler::mvc::MvcHandler;
use crate::handler::rest::RestHandler;
use crate::handler::RouteHandler;
use crate::plugin::Plugin;
use crate::registry::{ServiceEntry, ServiceRegistry};

/// Top-level router configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Handlers in dispatch order, keyed by a free-form name.
    pub handlers: Vec<HandlerConfig>,
}

/// One configured handler.
#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    /// Free-form handler name, used in diagnostics only.
    pub name: String,
    /// The handler class, resolved through the factory set.
    pub class: String,
    /// Handler-specific options.
    #[serde(default)]
    pub options: HandlerOptions,
}

/// The options block of a handler entry. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerOptions {
    /// Path prefix stripped before route matching.
    #[serde(default)]
    pub base_path: Option<String>,
    /// Explicit service list: key → class entry.
    #[serde(default)]
    pub services: HashMap<String, ServiceEntryConfig>,
    /// Namespace prefixes, scanned in order.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Folder trees, scanned in order.
    #[serde(default)]
    pub folders: Vec<PathBuf>,
    /// Plugins in hook-invocation order.
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    /// Suffix appended to normalized controller keys.
    #[serde(default)]
    pub controller_suffix: Option<String>,
    /// Suffix appended to normalized action names.
    #[serde(default)]
    pub action_suffix: Option<String>,
}

/// A service-list entry in the document: either a bare class name or a
/// class plus the file gating its instantiation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceEntryConfig {
    /// `Users: UsersController`
    Class(String),
    /// `Users: { class: UsersController, file: src/users.rs }`
    ClassInFile {
        /// The service class name.
        class: String,
        /// The file whose presence gates instantiation.
        file: PathBuf,
    },
}

impl From<ServiceEntryConfig> for ServiceEntry {
    fn from(config: ServiceEntryConfig) -> Self {
        match config {
            ServiceEntryConfig::Class(class) => ServiceEntry::Class(class),
            ServiceEntryConfig::ClassInFile { class, file } => {
                ServiceEntry::ClassInFile { class, file }
            }
        }
    }
}

/// A plugin entry in the document: a bare class name or a class plus an
/// arbitrary options payload passed to its factory.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PluginConfig {
    /// `- AccessLogPlugin`
    Class(String),
    /// `- { class: AccessControlPlugin, options: { realm: internal } }`
    WithOptions {
        /// The plugin class name.
        class: String,
        /// Free-form options forwarded to the plugin factory.
        #[serde(default)]
        options: Value,
    },
}

impl PluginConfig {
    fn class(&self) -> &str {
        match self {
            PluginConfig::Class(class) => class,
            PluginConfig::WithOptions { class, .. } => class,
        }
    }

    fn options(&self) -> &Value {
        match self {
            PluginConfig::Class(_) => &Value::Null,
            PluginConfig::WithOptions { options, .. } => options,
        }
    }
}

impl RouterConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(text: &str) -> Result<Self, RouteError> {
        serde_yaml::from_str(text)
            .map_err(|e| RouteError::Configuration(format!("invalid YAML config: {}", e)))
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, RouteError> {
        serde_json::from_str(text)
            .map_err(|e| RouteError::Configuration(format!("invalid JSON config: {}", e)))
    }
}

/// A constructor for a configured plugin, fed the entry's options payload.
pub type PluginFactory = Box<dyn Fn(&Value) -> Box<dyn Plugin>>;

/// A constructor for a configured handler, fed its options block, the
/// registry built from that block and the already-constructed plugin list.
pub type HandlerFactory =
    Box<dyn Fn(&HandlerOptions, ServiceRegistry, Vec<Box<dyn Plugin>>) -> Result<Box<dyn RouteHandler>, RouteError>>;

/// The class-name → constructor tables used to materialize a configuration
/// document.
///
/// The default set knows the three built-in handler classes (`MvcHandler`,
/// `RestHandler`, `CliTaskHandler`); plugin and service classes are always
/// application-supplied.
pub struct FactorySet {
    handlers: HashMap<String, HandlerFactory>,
    plugins: HashMap<String, PluginFactory>,
    services: HashMap<String, ServiceFactory>,
}

impl Default for FactorySet {
    fn default() -> Self {
        let mut set = Self {
            handlers: HashMap::new(),
            plugins: HashMap::new(),
            services: HashMap::new(),
        };
        set.register_handler_class(
            "MvcHandler",
            Box::new(|options, registry, plugins| {
                let mut handler = MvcHandler::new(registry, plugins);
                if let Some(base_path) = &options.base_path {
                    handler = handler.with_base_path(base_path.clone());
                }
                handler = handler.with_suffixes(
                    options.controller_suffix.clone().unwrap_or_default(),
                    options.action_suffix.clone().unwrap_or_default(),
                );
                Ok(Box::new(handler))
            }),
        );
        set.register_handler_class(
            "RestHandler",
            Box::new(|options, registry, plugins| {
                let mut handler = RestHandler::new(registry, plugins);
                if let Some(base_path) = &options.base_path {
                    handler = handler.with_base_path(base_path.clone());
                }
                if let Some(suffix) = &options.controller_suffix {
                    handler = handler.with_controller_suffix(suffix.clone());
                }
                Ok(Box::new(handler))
            }),
        );
        set.register_handler_class(
            "CliTaskHandler",
            Box::new(|_options, registry, plugins| {
                Ok(Box::new(CliTaskHandler::new(registry, plugins)))
            }),
        );
        set
    }
}

impl FactorySet {
    /// A factory set with only the built-in handler classes registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a handler class constructor.
    pub fn register_handler_class(&mut self, class: impl Into<String>, factory: HandlerFactory) {
        self.handlers.insert(class.into(), factory);
    }

    /// Register (or replace) a plugin class constructor.
    pub fn register_plugin_class(&mut self, class: impl Into<String>, factory: PluginFactory) {
        self.plugins.insert(class.into(), factory);
    }

    /// Register (or replace) a service class constructor. Namespace-mode
    /// classes use their fully-qualified `"prefix::Class"` name.
    pub fn register_service_class(&mut self, class: impl Into<String>, factory: ServiceFactory) {
        self.services.insert(class.into(), factory);
    }
}

/// Build a registry for one handler entry: every known service constructor
/// plus the entry's own service list / namespaces / folders, applied most
/// specific first.
fn build_registry(options: &HandlerOptions, factories: &FactorySet) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    for (class, factory) in &factories.services {
        registry.register_factory(class.clone(), Rc::clone(factory));
    }
    if !options.services.is_empty() {
        for (key, entry) in &options.services {
            registry.register(key.clone(), entry.clone().into());
        }
    } else if !options.namespaces.is_empty() {
        registry.set_namespaces(options.namespaces.clone());
    } else if !options.folders.is_empty() {
        registry.set_folders(options.folders.clone());
    }
    registry
}

/// Materialize a configuration document into a dispatcher.
///
/// Handlers are constructed in document order. Any unknown handler or
/// plugin class fails the whole build; a partially-built dispatcher is
/// never returned.
pub fn build_dispatcher(
    config: &RouterConfig,
    factories: &FactorySet,
) -> Result<Dispatcher, RouteError> {
    let mut dispatcher = Dispatcher::new();
    for handler_config in &config.handlers {
        let factory = factories.handlers.get(&handler_config.class).ok_or_else(|| {
            RouteError::Configuration(format!(
                "handler '{}' names unknown class '{}'",
                handler_config.name, handler_config.class
            ))
        })?;

        let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();
        for plugin_config in &handler_config.options.plugins {
            let plugin_factory =
                factories.plugins.get(plugin_config.class()).ok_or_else(|| {
                    RouteError::Configuration(format!(
                        "handler '{}' names unknown plugin class '{}'",
                        handler_config.name,
                        plugin_config.class()
                    ))
                })?;
            plugins.push(plugin_factory(plugin_config.options()));
        }

        let registry = build_registry(&handler_config.options, factories);
        let handler = factory(&handler_config.options, registry, plugins)?;
        debug!(
            name = %handler_config.name,
            class = %handler_config.class,
            plugins = handler_config.options.plugins.len(),
            "handler configured"
        );
        dispatcher.add_handler(handler);
    }
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip() {
        let config = RouterConfig::from_yaml_str(
            r#"
handlers:
  - name: api
    class: RestHandler
    options:
      basePath: /api
      services:
        Users: UsersController
        Legacy:
          class: LegacyController
          file: src/legacy.rs
  - name: web
    class: MvcHandler
"#,
        )
        .unwrap();
        assert_eq!(config.handlers.len(), 2);
        assert_eq!(config.handlers[0].name, "api");
        assert_eq!(
            config.handlers[0].options.base_path.as_deref(),
            Some("/api")
        );
        assert_eq!(config.handlers[0].options.services.len(), 2);
        assert!(matches!(
            config.handlers[0].options.services.get("Users"),
            Some(ServiceEntryConfig::Class(class)) if class == "UsersController"
        ));
        assert!(matches!(
            config.handlers[0].options.services.get("Legacy"),
            Some(ServiceEntryConfig::ClassInFile { .. })
        ));
        assert!(config.handlers[1].options.services.is_empty());
    }

    #[test]
    fn test_plugin_entries_parse_both_shapes() {
        let config = RouterConfig::from_yaml_str(
            r#"
handlers:
  - name: web
    class: MvcHandler
    options:
      plugins:
        - AccessLogPlugin
        - class: AccessControlPlugin
          options:
            realm: internal
"#,
        )
        .unwrap();
        let plugins = &config.handlers[0].options.plugins;
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].class(), "AccessLogPlugin");
        assert_eq!(plugins[0].options(), &Value::Null);
        assert_eq!(plugins[1].class(), "AccessControlPlugin");
        assert_eq!(plugins[1].options()["realm"], "internal");
    }

    #[test]
    fn test_invalid_yaml_is_a_configuration_error() {
        let err = RouterConfig::from_yaml_str("handlers: [").unwrap_err();
        assert!(matches!(err, RouteError::Configuration(_)));
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn test_json_document_parses() {
        let config = RouterConfig::from_json_str(
            r#"{"handlers": [{"name": "cli", "class": "CliTaskHandler"}]}"#,
        )
        .unwrap();
        assert_eq!(config.handlers[0].class, "CliTaskHandler");
    }

    #[test]
    fn test_unknown_handler_class_fails_the_build() {
        let config = RouterConfig::from_yaml_str(
            "handlers:\n  - name: web\n    class: NoSuchHandler\n",
        )
        .unwrap();
        let err = build_dispatcher(&config, &FactorySet::new()).unwrap_err();
        assert!(err.to_string().contains("NoSuchHandler"));
    }

    #[test]
    fn test_unknown_plugin_class_fails_the_build() {
        let config = RouterConfig::from_yaml_str(
            r#"
handlers:
  - name: web
    class: MvcHandler
    options:
      plugins:
        - GhostPlugin
"#,
        )
        .unwrap();
        let err = build_dispatcher(&config, &FactorySet::new()).unwrap_err();
        assert!(err.to_string().contains("GhostPlugin"));
    }

    #[test]
    fn test_built_in_handlers_build() {
        let config = RouterConfig::from_yaml_str(
            r#"
handlers:
  - name: api
    class: RestHandler
  - name: web
    class: MvcHandler
  - name: cli
    class: CliTaskHandler
"#,
        )
        .unwrap();
        let dispatcher = build_dispatcher(&config, &FactorySet::new()).unwrap();
        assert_eq!(dispatcher.len(), 3);
    }
}
