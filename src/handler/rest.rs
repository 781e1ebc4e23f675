//! REST route-template handler.
//!
//! Handles REST-style URLs like `/v1.2/users/42/details`: an API version
//! segment, a controller segment, an optional letters-only action segment
//! and an optional numeric object-id segment. Paths are matched against an
//! ordered table of route templates compiled to anchored regexes; the
//! first template that matches the full path wins, with no backtracking
//! across templates.
//!
//! The handler composes the MVC segment matcher as an internal helper for
//! backward-compatible positional parameter extraction, and always forces
//! a JSON-capable encoder.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{mvc, strip_base_path, Invoker, RouteHandler};
use crate::encoder::JsonEncoder;
use crate::errors::RouteError;
use crate::plugin::Plugin;
use crate::registry::ServiceRegistry;
use crate::request::{ActionArgs, RawRequest, RouteRequest};
use crate::response::RouteOutcome;

/// The named-parameter key under which the extracted API version is passed
/// to the invoked action.
pub const KEY_API_VERSION: &str = "apiVersion";

/// What a matched route template resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `/v{version}/{controller}`
    Controller,
    /// `/v{version}/{controller}/{action}`
    ControllerAction,
    /// `/v{version}/{controller}/{objectId}`
    ControllerId,
    /// `/v{version}/{controller}/{action}/{objectId}` (either order)
    ControllerActionId,
}

impl RouteKind {
    /// True if this kind carries a numeric object id.
    #[must_use]
    pub fn has_id(self) -> bool {
        matches!(self, RouteKind::ControllerId | RouteKind::ControllerActionId)
    }
}

/// The default route-template table, tried in declared order.
///
/// The version segment accepts dotted numerics (`1`, `1.2`), the
/// controller segment must start with a letter (so two numeric segments
/// never match), the action segment is constrained to letters and the
/// object-id segment to digits.
const DEFAULT_ROUTES: &[(&str, RouteKind)] = &[
    ("/v{version}/{controller}", RouteKind::Controller),
    ("/v{version}/{controller}/", RouteKind::Controller),
    (
        "/v{version}/{controller}/{action:[a-zA-Z]+}",
        RouteKind::ControllerAction,
    ),
    (
        "/v{version}/{controller}/{action:[a-zA-Z]+}/",
        RouteKind::ControllerAction,
    ),
    (
        "/v{version}/{controller}/{objectId:[0-9]+}",
        RouteKind::ControllerId,
    ),
    (
        "/v{version}/{controller}/{objectId:[0-9]+}/",
        RouteKind::ControllerId,
    ),
    (
        "/v{version}/{controller}/{action:[a-zA-Z]+}/{objectId:[0-9]+}",
        RouteKind::ControllerActionId,
    ),
    (
        "/v{version}/{controller}/{action:[a-zA-Z]+}/{objectId:[0-9]+}/",
        RouteKind::ControllerActionId,
    ),
    (
        "/v{version}/{controller}/{objectId:[0-9]+}/{action:[a-zA-Z]+}",
        RouteKind::ControllerActionId,
    ),
    (
        "/v{version}/{controller}/{objectId:[0-9]+}/{action:[a-zA-Z]+}/",
        RouteKind::ControllerActionId,
    ),
];

/// Character class for the `{version}` placeholder: dotted numerics.
const VERSION_CLASS: &str = r"[0-9]+(?:\.[0-9]+)?";
/// Character class for the `{controller}` placeholder: must start with a
/// letter, so a bare numeric segment never matches as a controller.
const CONTROLLER_CLASS: &str = r"[a-zA-Z][a-zA-Z0-9_]*";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(\w+)(?::([^}]+))?\}").expect("placeholder pattern compiles")
});

/// Compile a route template (`/v{version}/{controller}/{objectId:[0-9]+}`)
/// into an anchored regex with named capture groups.
pub(crate) fn compile_template(template: &str) -> Result<Regex, RouteError> {
    let mut pattern = String::with_capacity(template.len() + 8);
    pattern.push('^');
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).expect("capture 0 always present");
        pattern.push_str(&regex::escape(&template[last..whole.start()]));
        let name = &caps[1];
        let class = match caps.get(2) {
            Some(class) => class.as_str(),
            None => match name {
                "version" => VERSION_CLASS,
                "controller" => CONTROLLER_CLASS,
                _ => "[^/]+",
            },
        };
        pattern.push_str("(?P<");
        pattern.push_str(name);
        pattern.push('>');
        pattern.push_str(class);
        pattern.push(')');
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| RouteError::Configuration(format!("invalid route template '{}': {}", template, e)))
}

/// Handles REST requests against an ordered route-template table.
pub struct RestHandler {
    invoker: Invoker,
    base_path: String,
    controller_suffix: String,
    routes: Vec<(Regex, RouteKind)>,
}

impl RestHandler {
    /// Build a REST handler with the default route table and a forced
    /// JSON encoder.
    pub fn new(registry: ServiceRegistry, plugins: Vec<Box<dyn Plugin>>) -> Self {
        let mut invoker = Invoker::new(registry, plugins);
        invoker.set_encoder(Box::new(JsonEncoder));
        let routes = DEFAULT_ROUTES
            .iter()
            .map(|(template, kind)| {
                let regex = compile_template(template).expect("default route table compiles");
                (regex, *kind)
            })
            .collect();
        Self {
            invoker,
            base_path: "/".to_string(),
            controller_suffix: String::new(),
            routes,
        }
    }

    /// Set the base-path prefix stripped before matching.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the suffix appended to normalized controller keys.
    #[must_use]
    pub fn with_controller_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.controller_suffix = suffix.into();
        self
    }

    /// Replace the route table with a custom ordered template list.
    pub fn with_routes(mut self, routes: &[(&str, RouteKind)]) -> Result<Self, RouteError> {
        let mut compiled = Vec::with_capacity(routes.len());
        for (template, kind) in routes {
            compiled.push((compile_template(template)?, *kind));
        }
        self.routes = compiled;
        Ok(self)
    }

    /// The handler's invocation engine (registry access, claimed request).
    pub fn invoker_mut(&mut self) -> &mut Invoker {
        &mut self.invoker
    }
}

impl RouteHandler for RestHandler {
    fn is_appropriate(&mut self, request: &RawRequest) -> bool {
        let RawRequest::Http(http) = request else {
            return false;
        };

        let path = strip_base_path(&http.path, &self.base_path);
        // MVC segment matching first, for backward-compatible positional
        // parameter extraction.
        let segments = mvc::segment_route(path);

        let matched = self
            .routes
            .iter()
            .find_map(|(regex, kind)| regex.captures(path).map(|caps| (caps, *kind)));
        let Some((caps, kind)) = matched else {
            debug!(path = %http.path, "no REST route template matched");
            return false;
        };

        let version = caps
            .name("version")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let controller_segment = caps
            .name("controller")
            .map(|m| m.as_str())
            .unwrap_or(mvc::DEFAULT_ROUTE_NAME);
        let action_segment = caps
            .name("action")
            .map(|m| m.as_str())
            .unwrap_or(mvc::DEFAULT_ROUTE_NAME);
        let controller = mvc::normalize_controller(controller_segment, &self.controller_suffix);
        let action = mvc::normalize_action(action_segment, "");

        let mut args = ActionArgs::new();
        if kind.has_id() {
            // The template's [0-9]+ class guarantees a parseable id.
            let Some(id) = caps.name("objectId").and_then(|m| m.as_str().parse::<i64>().ok())
            else {
                return false;
            };
            args.push(Value::from(id));
        } else {
            for param in segments.params {
                args.push(Value::from(param));
            }
        }
        // The API version rides along as a named parameter, after any id.
        args.push_named(KEY_API_VERSION, Value::String(version.clone()));

        debug!(
            path = %http.path,
            controller = %controller,
            action = %action,
            version = %version,
            kind = ?kind,
            "REST route matched"
        );
        self.invoker.claim(RouteRequest::new(
            controller,
            action,
            Some(http.method.clone()),
            args,
        ));
        true
    }

    fn perform_route(&mut self) -> Result<RouteOutcome, RouteError> {
        self.invoker.perform()
    }
}
