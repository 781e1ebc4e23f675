//! MVC path-segment handler.
//!
//! Maps URIs like `/controller/action/param1/param2/...` to a controller
//! action. This variant is the fallback/catch-all: it claims every HTTP
//! request it sees.

use serde_json::Value;
use tracing::debug;

use super::{strip_base_path, Invoker, RouteHandler};
use crate::encoder::Encoder;
use crate::errors::RouteError;
use crate::plugin::Plugin;
use crate::registry::ServiceRegistry;
use crate::request::{ActionArgs, RawRequest, RouteRequest};
use crate::response::RouteOutcome;

/// Default controller and action used for empty paths.
pub const DEFAULT_ROUTE_NAME: &str = "index";

/// The outcome of splitting a path into MVC route components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SegmentRoute {
    pub controller: String,
    pub action: String,
    pub params: Vec<String>,
}

/// Split a path into controller, action and positional parameters.
///
/// A single leading separator is stripped; empty segments are discarded.
/// Each segment count gets its own explicit branch:
///
/// - 0 segments → default controller and action
/// - 1 segment → controller, default action
/// - 2 segments → controller and action, no parameters
/// - 3+ segments → controller, action, remaining segments as parameters
pub(crate) fn segment_route(path: &str) -> SegmentRoute {
    let path = path.strip_prefix('/').unwrap_or(path);
    let segments: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let (controller, action, params) = match segments.len() {
        0 => (DEFAULT_ROUTE_NAME, DEFAULT_ROUTE_NAME, Vec::new()),
        1 => (segments[0], DEFAULT_ROUTE_NAME, Vec::new()),
        2 => (segments[0], segments[1], Vec::new()),
        _ => (
            segments[0],
            segments[1],
            segments[2..].iter().map(|s| s.to_string()).collect(),
        ),
    };
    SegmentRoute {
        controller: controller.to_string(),
        action: action.to_string(),
        params,
    }
}

/// Normalize a controller segment: first letter uppercased, rest
/// lowercased, with the handler's configured suffix appended.
pub(crate) fn normalize_controller(segment: &str, suffix: &str) -> String {
    let lowered = segment.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len() + suffix.len());
    let mut chars = lowered.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    out.push_str(suffix);
    out
}

/// Normalize an action segment: lowercased, with the handler's configured
/// suffix appended.
pub(crate) fn normalize_action(segment: &str, suffix: &str) -> String {
    format!("{}{}", segment.trim().to_lowercase(), suffix)
}

/// Handles MVC requests by splitting the URL path on separators.
pub struct MvcHandler {
    invoker: Invoker,
    base_path: String,
    controller_suffix: String,
    action_suffix: String,
}

impl MvcHandler {
    /// Build an MVC handler around its registry and ordered plugin list.
    pub fn new(registry: ServiceRegistry, plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            invoker: Invoker::new(registry, plugins),
            base_path: "/".to_string(),
            controller_suffix: String::new(),
            action_suffix: String::new(),
        }
    }

    /// Set the base-path prefix stripped before matching.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the suffixes appended to normalized controller keys and action
    /// names. Both default to empty.
    #[must_use]
    pub fn with_suffixes(
        mut self,
        controller_suffix: impl Into<String>,
        action_suffix: impl Into<String>,
    ) -> Self {
        self.controller_suffix = controller_suffix.into();
        self.action_suffix = action_suffix.into();
        self
    }

    /// Override the default pass-through encoder.
    #[must_use]
    pub fn with_encoder(mut self, encoder: Box<dyn Encoder>) -> Self {
        self.invoker.set_encoder(encoder);
        self
    }

    /// The handler's invocation engine (registry access, claimed request).
    pub fn invoker_mut(&mut self) -> &mut Invoker {
        &mut self.invoker
    }
}

impl RouteHandler for MvcHandler {
    fn is_appropriate(&mut self, request: &RawRequest) -> bool {
        let RawRequest::Http(http) = request else {
            return false;
        };

        let path = strip_base_path(&http.path, &self.base_path);
        let segments = segment_route(path);
        let controller = normalize_controller(&segments.controller, &self.controller_suffix);
        let action = normalize_action(&segments.action, &self.action_suffix);

        let mut args = ActionArgs::new();
        for param in segments.params {
            args.push(Value::from(param));
        }

        debug!(
            path = %http.path,
            controller = %controller,
            action = %action,
            "MVC route extracted"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_resolves_to_defaults() {
        let route = segment_route("/");
        assert_eq!(route.controller, "index");
        assert_eq!(route.action, "index");
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_single_segment_is_controller() {
        let route = segment_route("/users");
        assert_eq!(route.controller, "users");
        assert_eq!(route.action, "index");
    }

    #[test]
    fn test_two_segments_have_no_params() {
        let route = segment_route("/users/list");
        assert_eq!(route.controller, "users");
        assert_eq!(route.action, "list");
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_extra_segments_become_params() {
        let route = segment_route("/foo/bar/1/2");
        assert_eq!(route.controller, "foo");
        assert_eq!(route.action, "bar");
        assert_eq!(route.params, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_empty_segments_are_discarded() {
        let route = segment_route("//users///list//");
        assert_eq!(route.controller, "users");
        assert_eq!(route.action, "list");
    }

    #[test]
    fn test_controller_normalization() {
        assert_eq!(normalize_controller("fOO", ""), "Foo");
        assert_eq!(normalize_controller(" users ", "Controller"), "UsersController");
    }

    #[test]
    fn test_action_normalization() {
        assert_eq!(normalize_action("BAR", ""), "bar");
        assert_eq!(normalize_action("list", "_action"), "list_action");
    }
}
