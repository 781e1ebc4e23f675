//! Request dispatcher: ordered handler selection.

use tracing::{debug, warn};

use crate::errors::RouteError;
use crate::handler::RouteHandler;
use crate::request::RawRequest;
use crate::response::RouteOutcome;

/// The outcome of a dispatch attempt.
#[derive(Debug)]
pub enum DispatchResult {
    /// A handler claimed and served the request.
    Handled(RouteOutcome),
    /// No configured handler claimed the request. Not a failure.
    NoHandler,
}

impl DispatchResult {
    /// True if a handler served the request.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchResult::Handled(_))
    }

    /// The serialized outcome, if handled.
    #[must_use]
    pub fn outcome(&self) -> Option<&RouteOutcome> {
        match self {
            DispatchResult::Handled(outcome) => Some(outcome),
            DispatchResult::NoHandler => None,
        }
    }

    /// Consume into the serialized outcome, if handled.
    #[must_use]
    pub fn into_outcome(self) -> Option<RouteOutcome> {
        match self {
            DispatchResult::Handled(outcome) => Some(outcome),
            DispatchResult::NoHandler => None,
        }
    }
}

/// Owns the ordered list of configured handlers and routes each inbound
/// request to the first one that claims it.
///
/// Handler order is declaration order: there is no priority field and no
/// reordering. Selection short-circuits on the first positive
/// `is_appropriate`, so handlers after the match are never consulted.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Box<dyn RouteHandler>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Dispatcher {
    /// An empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler; declaration order is selection order.
    pub fn add_handler(&mut self, handler: Box<dyn RouteHandler>) {
        self.handlers.push(handler);
    }

    /// Number of configured handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no handlers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Try each handler in declaration order and run the first match.
    ///
    /// The first handler whose `is_appropriate` returns true performs the
    /// route and its result is returned directly; a failure there does not
    /// fall through to another handler, since selection has already
    /// completed. Exhausting the list yields
    /// [`DispatchResult::NoHandler`] rather than an error.
    pub fn dispatch(&mut self, request: &RawRequest) -> Result<DispatchResult, RouteError> {
        for (index, handler) in self.handlers.iter_mut().enumerate() {
            if handler.is_appropriate(request) {
                debug!(handler_index = index, "handler claimed request");
                return handler.perform_route().map(DispatchResult::Handled);
            }
        }
        warn!("no handler claimed the request");
        Ok(DispatchResult::NoHandler)
    }
}
