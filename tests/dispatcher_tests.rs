mod common;

use quickrouter::dispatcher::{DispatchResult, Dispatcher};
use quickrouter::errors::RouteError;
use quickrouter::{CliTaskHandler, MvcHandler, RestHandler, RouteHandler};
use quickrouter::request::{HttpRequest, RawRequest};
use quickrouter::response::RouteOutcome;

use common::echo_registry;
use http::Method;

fn http_get(uri: &str) -> RawRequest {
    RawRequest::http(HttpRequest::from_uri(Method::GET, uri, None))
}

/// A handler that never claims anything, to sit in front of real handlers.
struct NeverHandler;

impl RouteHandler for NeverHandler {
    fn is_appropriate(&mut self, _request: &RawRequest) -> bool {
        false
    }

    fn perform_route(&mut self) -> Result<RouteOutcome, RouteError> {
        panic!("perform_route on an unclaimed handler");
    }
}

#[test]
fn test_first_matching_handler_wins() {
    let mut dispatcher = Dispatcher::new();
    // The REST handler claims the versioned path before the MVC catch-all.
    dispatcher.add_handler(Box::new(RestHandler::new(echo_registry(&["Test"]), vec![])));
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&["Test"]), vec![])));

    let result = dispatcher.dispatch(&http_get("/v1/test")).unwrap();
    let outcome = result.into_outcome().unwrap();
    assert_eq!(outcome.status, 200);
    // The REST handler's JSON encoder quotes the string payload.
    assert_eq!(outcome.body, "\"index\"");
}

#[test]
fn test_non_matching_handlers_are_skipped() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_handler(Box::new(NeverHandler));
    dispatcher.add_handler(Box::new(RestHandler::new(echo_registry(&["Test"]), vec![])));
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&["Test"]), vec![])));

    let result = dispatcher.dispatch(&http_get("/test")).unwrap();
    assert!(result.is_handled());
}

#[test]
fn test_no_handler_is_not_an_error() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_handler(Box::new(NeverHandler));

    let result = dispatcher.dispatch(&http_get("/anything")).unwrap();
    assert!(matches!(result, DispatchResult::NoHandler));
}

#[test]
fn test_cli_request_skips_http_handlers() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&["Test"]), vec![])));
    dispatcher.add_handler(Box::new(CliTaskHandler::new(
        echo_registry(&["Cleanup"]),
        vec![],
    )));

    let request = RawRequest::cli(["script", "--task", "Cleanup", "--action", "test"]);
    let result = dispatcher.dispatch(&request).unwrap();
    let outcome = result.into_outcome().unwrap();
    assert_eq!(outcome.body, "This is a test service.");
}

#[test]
fn test_selected_handler_failure_does_not_fall_through() {
    let mut dispatcher = Dispatcher::new();
    // The MVC catch-all claims the request, then fails resolution; the
    // second handler must never be consulted.
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&[]), vec![])));
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&["Ghost"]), vec![])));

    let err = dispatcher.dispatch(&http_get("/ghost")).unwrap_err();
    assert!(matches!(err, RouteError::Handler(_)));
    assert!(err.to_string().contains("Ghost"));
}

#[test]
fn test_action_exception_surfaces_its_message() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&["Test"]), vec![])));

    let err = dispatcher.dispatch(&http_get("/test/fail")).unwrap_err();
    assert!(matches!(err, RouteError::Action(_)));
    assert_eq!(err.to_string(), "A generic exception.");
    assert_eq!(err.status(), 500);
}

#[test]
fn test_missing_action_is_a_handler_error() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_handler(Box::new(MvcHandler::new(echo_registry(&["Test"]), vec![])));

    let err = dispatcher.dispatch(&http_get("/test/nosuchaction")).unwrap_err();
    assert_eq!(err.to_string(), "Test does not have method nosuchaction");
}
