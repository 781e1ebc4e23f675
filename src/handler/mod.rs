//! Request handlers.
//!
//! A handler is a strategy object that claims and serves a class of inbound
//! requests. The dispatcher asks each configured handler
//! [`RouteHandler::is_appropriate`] in declaration order and the first
//! positive match gets [`RouteHandler::perform_route`].
//!
//! Three variants ship with the crate, unified behind one trait rather
//! than an inheritance chain:
//!
//! - [`MvcHandler`](mvc::MvcHandler) - path-segment routing
//!   (`/controller/action/param1/param2`), the catch-all fallback.
//! - [`RestHandler`](rest::RestHandler) - regex route templates with API
//!   version extraction (`/v1.2/users/42`). Composes the MVC segment
//!   matcher as an internal helper.
//! - [`CliTaskHandler`](cli::CliTaskHandler) - argv flag routing
//!   (`--task Name --action name`).
//!
//! All variants share the same invocation engine, [`Invoker`], which owns
//! the handler's service registry, plugin list, encoder and transient
//! per-dispatch state.

pub mod cli;
pub mod mvc;
pub mod rest;

use tracing::{debug, info};

use crate::controller::ActionResult;
use crate::encoder::{Encoder, NullEncoder};
use crate::errors::RouteError;
use crate::plugin::Plugin;
use crate::registry::ServiceRegistry;
use crate::request::{RawRequest, RouteRequest};
use crate::response::{Response, RouteOutcome};

/// A strategy object that claims and serves a class of inbound requests.
pub trait RouteHandler {
    /// Decide whether this handler serves the request. A positive answer
    /// caches the extracted route information for the subsequent
    /// [`RouteHandler::perform_route`] call on the same instance.
    fn is_appropriate(&mut self, request: &RawRequest) -> bool;

    /// Run the full invocation sequence for the previously claimed request.
    fn perform_route(&mut self) -> Result<RouteOutcome, RouteError>;
}

/// The invocation engine shared by all handler variants.
///
/// Owns the handler-scoped collaborators (service registry, ordered plugin
/// list, encoder) and the transient per-dispatch state: the resolved
/// [`RouteRequest`] claimed by `is_appropriate`. The request is *taken*
/// (not copied) by [`Invoker::perform`], so repeated or interleaved
/// dispatches on the same handler never leak parameters across calls.
pub struct Invoker {
    registry: ServiceRegistry,
    plugins: Vec<Box<dyn Plugin>>,
    encoder: Box<dyn Encoder>,
    request: Option<RouteRequest>,
}

impl Invoker {
    /// Build an invoker with the default pass-through encoder.
    pub fn new(registry: ServiceRegistry, plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            registry,
            plugins,
            encoder: Box::new(NullEncoder),
            request: None,
        }
    }

    /// Replace the active encoder.
    pub fn set_encoder(&mut self, encoder: Box<dyn Encoder>) {
        self.encoder = encoder;
    }

    /// The handler's service registry.
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Mutable access to the handler's service registry.
    pub fn registry_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registry
    }

    /// The request claimed by the last `is_appropriate` call, if any.
    #[must_use]
    pub fn request(&self) -> Option<&RouteRequest> {
        self.request.as_ref()
    }

    /// Stage the resolved descriptor for the next [`Invoker::perform`].
    pub(crate) fn claim(&mut self, request: RouteRequest) {
        self.request = Some(request);
    }

    /// Run the uniform invocation sequence:
    ///
    /// 1. `after_handler_selected` and `before_controller_selected` hooks.
    /// 2. Resolve the controller through the service registry; resolution
    ///    failures are wrapped into [`RouteError::Handler`], preserving
    ///    the original message text.
    /// 3. Verify the controller exposes the action.
    /// 4. `after_controller_selected` hooks.
    /// 5. `initialize(request)` on the controller.
    /// 6. `before_action_invoked` hooks.
    /// 7. Invoke the action.
    /// 8. `after_action_invoked` hooks.
    /// 9. Wrap a bare return value in a default response and encode it.
    ///
    /// Any failure, including one raised inside a plugin hook, aborts the
    /// remaining steps.
    pub fn perform(&mut self) -> Result<RouteOutcome, RouteError> {
        let request = self.request.take().ok_or_else(|| {
            RouteError::Handler("no request has been claimed by this handler".into())
        })?;

        for plugin in &mut self.plugins {
            plugin.after_handler_selected(&request)?;
        }
        for plugin in &mut self.plugins {
            plugin.before_controller_selected(&request)?;
        }

        let controller = self
            .registry
            .resolve(request.controller(), true)
            .map_err(|e| RouteError::Handler(e.to_string()))?;

        if !controller.borrow().has_action(request.action()) {
            return Err(RouteError::Handler(format!(
                "{} does not have method {}",
                request.controller(),
                request.action()
            )));
        }

        for plugin in &mut self.plugins {
            plugin.after_controller_selected(&request, &controller, request.action())?;
        }

        controller.borrow_mut().initialize(&request);

        for plugin in &mut self.plugins {
            plugin.before_action_invoked(&request, &controller, request.action())?;
        }

        debug!(
            controller = %request.controller(),
            action = %request.action(),
            params = request.args().len(),
            "invoking action"
        );
        let result = controller
            .borrow_mut()
            .invoke(request.action(), request.args())
            .map_err(RouteError::Action)?;

        for plugin in &mut self.plugins {
            plugin.after_action_invoked(&request, &controller, request.action(), &result)?;
        }

        let response = match result {
            ActionResult::Response(response) => response,
            ActionResult::Raw(value) => Response::new(value),
        };
        let body = self.encoder.encode(&response)?;

        info!(
            controller = %request.controller(),
            action = %request.action(),
            status = response.status(),
            "action invoked"
        );
        Ok(RouteOutcome {
            status: response.status(),
            body,
        })
    }
}

/// Strip the configured base-path prefix before matching.
pub(crate) fn strip_base_path<'a>(path: &'a str, base_path: &str) -> &'a str {
    if base_path.is_empty() || base_path == "/" {
        return path;
    }
    path.strip_prefix(base_path).unwrap_or(path)
}
