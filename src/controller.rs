//! The controller/task contract invoked by handlers.
//!
//! Controllers are application collaborators: the core only requires an
//! `initialize` lifecycle step, a way to check whether an action exists and
//! a way to invoke it. Instantiation goes through registered factory
//! functions rather than runtime reflection, so every controller class is
//! a closure registered at startup (see [`service_factory`]).

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::request::{ActionArgs, RouteRequest};
use crate::response::Response;

/// What an invoked action returns: either a bare value the handler will
/// wrap in a default success [`Response`], or a pre-built response.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// A raw payload, to be wrapped with status 200.
    Raw(Value),
    /// A fully-formed response with its own status code.
    Response(Response),
}

impl From<Value> for ActionResult {
    fn from(value: Value) -> Self {
        ActionResult::Raw(value)
    }
}

impl From<Response> for ActionResult {
    fn from(response: Response) -> Self {
        ActionResult::Response(response)
    }
}

/// Contract for controller and task objects resolved through the service
/// registry.
pub trait Controller {
    /// Lifecycle step run before invocation, letting the target capture
    /// ambient request context. No-op by default.
    fn initialize(&mut self, _request: &RouteRequest) {}

    /// True if this controller exposes the named action.
    fn has_action(&self, action: &str) -> bool;

    /// Invoke the named action with the extracted parameter list.
    ///
    /// Only called after `has_action` returned true for `action`.
    fn invoke(&mut self, action: &str, args: &ActionArgs) -> anyhow::Result<ActionResult>;
}

impl std::fmt::Debug for dyn Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Controller")
    }
}

/// A resolved controller instance.
///
/// The dispatch core is single-threaded per request, so instances are
/// shared with `Rc<RefCell<..>>`; cache identity is observable through
/// [`Rc::ptr_eq`].
pub type SharedController = Rc<RefCell<dyn Controller>>;

/// A registered constructor for a controller class.
pub type ServiceFactory = Rc<dyn Fn() -> SharedController>;

/// Wrap a plain constructor closure into a [`ServiceFactory`].
///
/// # Example
///
/// ```rust,ignore
/// registry.register_factory("UsersController", service_factory(UsersController::new));
/// ```
pub fn service_factory<C, F>(build: F) -> ServiceFactory
where
    C: Controller + 'static,
    F: Fn() -> C + 'static,
{
    Rc::new(move || Rc::new(RefCell::new(build())) as SharedController)
}
