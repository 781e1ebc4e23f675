//! The top-level routing facade.
//!
//! [`Router`] wraps a [`Dispatcher`] behind the two entry points an
//! application embeds: [`Router::handle_http_route`] for HTTP traffic and
//! [`Router::handle_cli_route`] for command-line invocations. Both entry
//! points are total: every failure inside the dispatch core is converted
//! into a response here, so embedding code never sees a `Result`.

use serde_json::Value;
use tracing::error;

use crate::config::{build_dispatcher, FactorySet, RouterConfig};
use crate::dispatcher::{DispatchResult, Dispatcher};
use crate::errors::RouteError;
use crate::request::{method_from_verb, HttpRequest, RawRequest};
use crate::response::RouteOutcome;

/// Body returned by [`Router::handle_cli_route`] when no handler claims the
/// invocation.
const NO_CLI_HANDLER_MESSAGE: &str = "No CLI handler registered.\n";

/// The embedding-facing router: configured once, then fed raw requests.
pub struct Router {
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Router")
    }
}

impl Router {
    /// Wrap an already-assembled dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Assemble a router from a parsed configuration document and the
    /// factory set resolving its class names.
    pub fn from_config(config: &RouterConfig, factories: &FactorySet) -> Result<Self, RouteError> {
        Ok(Self::new(build_dispatcher(config, factories)?))
    }

    /// Mutable access to the underlying dispatcher, for programmatic
    /// handler registration.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Route one HTTP request and produce the response to send.
    ///
    /// Failure shaping, mirrored by the status code:
    ///
    /// - an unparseable verb short-circuits to 400 before dispatch
    /// - no handler claiming the request yields an empty 404
    /// - any dispatch failure becomes a body carrying the error's display
    ///   text, with the error's own status code (500 unless a plugin
    ///   rejection supplied one)
    pub fn handle_http_route(
        &mut self,
        uri: &str,
        verb: &str,
        body: Option<Value>,
    ) -> RouteOutcome {
        let method = match method_from_verb(verb) {
            Ok(method) => method,
            Err(_) => return RouteOutcome::empty(400),
        };
        let request = RawRequest::http(HttpRequest::from_uri(method, uri, body));
        match self.dispatcher.dispatch(&request) {
            Ok(DispatchResult::Handled(outcome)) => outcome,
            Ok(DispatchResult::NoHandler) => RouteOutcome::empty(404),
            Err(err) => {
                error!(uri = %uri, error = %err, "HTTP route failed");
                RouteOutcome {
                    status: err.status(),
                    body: err.to_string(),
                }
            }
        }
    }

    /// Route one CLI invocation and produce the text to print.
    ///
    /// A handled invocation returns the encoded body verbatim. An
    /// unclaimed invocation (no `--task`, or an unregistered task) gets a
    /// fixed notice; failures get the error's display text. Only the
    /// notice and failure outputs carry a trailing newline.
    pub fn handle_cli_route(&mut self, argv: &[String]) -> String {
        let request = RawRequest::Cli(crate::request::CliInvocation {
            argv: argv.to_vec(),
        });
        match self.dispatcher.dispatch(&request) {
            Ok(DispatchResult::Handled(outcome)) => outcome.body,
            Ok(DispatchResult::NoHandler) => NO_CLI_HANDLER_MESSAGE.to_string(),
            Err(err) => {
                error!(error = %err, "CLI route failed");
                format!("{}\n", err)
            }
        }
    }
}
