//! quickrouter - an MVC/REST/CLI request router.
//!
//! The crate routes inbound requests (HTTP or command-line) to application
//! controllers through an ordered list of handlers, with a dependency
//! injection registry for controller instantiation and a plugin pipeline
//! for cross-cutting hooks.
//!
//! # Architecture
//!
//! ```text
//! Router (facade)
//!   └── Dispatcher ── ordered handler list, first claim wins
//!         ├── MvcHandler      /controller/action/params  (catch-all)
//!         ├── RestHandler     /v1.2/users/42  route templates
//!         └── CliTaskHandler  --task Name --action name
//!               └── Invoker ── shared invocation engine
//!                     ├── ServiceRegistry  key → controller instance
//!                     ├── [Plugin]         lifecycle hooks, in order
//!                     └── Encoder          response body serialization
//! ```
//!
//! Each handler owns its own registry and plugin list; nothing is global.
//! A request flows through exactly one handler: the dispatcher asks each
//! in declaration order whether it is appropriate and the first positive
//! answer serves the request, even if it subsequently fails.
//!
//! # Example
//!
//! ```rust
//! use quickrouter::config::{FactorySet, RouterConfig};
//! use quickrouter::controller::{service_factory, ActionResult, Controller};
//! use quickrouter::request::ActionArgs;
//! use quickrouter::router::Router;
//! use serde_json::json;
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn has_action(&self, action: &str) -> bool {
//!         action == "index"
//!     }
//!
//!     fn invoke(&mut self, _action: &str, _args: &ActionArgs) -> anyhow::Result<ActionResult> {
//!         Ok(json!(["alice", "bob"]).into())
//!     }
//! }
//!
//! let config = RouterConfig::from_yaml_str(
//!     "handlers:\n  - name: api\n    class: RestHandler\n    options:\n      services:\n        Users: UsersController\n",
//! )?;
//! let mut factories = FactorySet::new();
//! factories.register_service_class("UsersController", service_factory(|| Users));
//!
//! let mut router = Router::from_config(&config, &factories)?;
//! let outcome = router.handle_http_route("/v1/users", "GET", None);
//! assert_eq!(outcome.status, 200);
//! assert_eq!(outcome.body, "[\"alice\",\"bob\"]");
//! # Ok::<(), quickrouter::errors::RouteError>(())
//! ```

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod encoder;
pub mod errors;
pub mod handler;
pub mod plugin;
pub mod registry;
pub mod request;
pub mod response;
pub mod router;

pub use config::{FactorySet, RouterConfig};
pub use controller::{service_factory, ActionResult, Controller, ServiceFactory, SharedController};
pub use dispatcher::{DispatchResult, Dispatcher};
pub use encoder::{Encoder, JsonEncoder, NullEncoder};
pub use errors::RouteError;
pub use handler::{cli::CliTaskHandler, mvc::MvcHandler, rest::RestHandler, RouteHandler};
pub use plugin::{HookResult, Plugin, PluginRejection};
pub use registry::{ProvisioningMode, ServiceEntry, ServiceRegistry};
pub use request::{ActionArgs, CliInvocation, HttpRequest, RawRequest, RouteRequest};
pub use response::{Response, RouteOutcome};
pub use router::Router;
