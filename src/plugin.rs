//! Lifecycle hook plugins.
//!
//! Plugins intercept the dispatch sequence at fixed extension points,
//! letting cross-cutting concerns (authentication, logging) observe or
//! reject a request without touching handler logic. They are registered
//! per-handler in a declared order; that order is the invocation order for
//! both "before" and "after" hooks.
//!
//! Hook points, in sequence:
//!
//! ```text
//! dispatcher picks handler
//!   → after_handler_selected
//!   → before_controller_selected
//!   → (service registry resolves controller, action verified)
//!   → after_controller_selected
//!   → before_action_invoked
//!   → (action runs)
//!   → after_action_invoked
//! ```
//!
//! A hook signals rejection by returning a [`PluginRejection`]; this stops
//! iteration over the remaining plugins for that hook and aborts the
//! enclosing route sequence. "After" hooks run only if the guarded step
//! actually completed. All hooks are synchronous and run on the request's
//! own thread of control.

use std::fmt;

use crate::controller::{ActionResult, SharedController};
use crate::request::RouteRequest;

/// A rejection raised by a plugin hook, carrying the status code to report
/// (e.g. 401 for failed authentication).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRejection {
    /// The numeric status code for this rejection.
    pub status: u16,
    /// Human-readable rejection message.
    pub message: String,
}

impl PluginRejection {
    /// Create a rejection with an explicit status code.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 401 rejection.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }
}

impl fmt::Display for PluginRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PluginRejection {}

/// Result type for plugin hooks.
pub type HookResult = Result<(), PluginRejection>;

/// A lifecycle hook observer. Every hook is a no-op by default; plugins
/// override the points they care about.
///
/// Plugins take `&mut self` so handler-scoped state (counters, per-request
/// scratch data) does not need interior mutability.
pub trait Plugin {
    /// Runs once the dispatcher has committed to this plugin's handler.
    fn after_handler_selected(&mut self, _request: &RouteRequest) -> HookResult {
        Ok(())
    }

    /// Runs before the service registry is consulted.
    fn before_controller_selected(&mut self, _request: &RouteRequest) -> HookResult {
        Ok(())
    }

    /// Runs once the controller instance is resolved and the action
    /// verified to exist.
    fn after_controller_selected(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
    ) -> HookResult {
        Ok(())
    }

    /// Runs immediately before the action is invoked.
    fn before_action_invoked(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
    ) -> HookResult {
        Ok(())
    }

    /// Runs after the action returned successfully, with its return value.
    fn after_action_invoked(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
        _result: &ActionResult,
    ) -> HookResult {
        Ok(())
    }
}
