//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use quickrouter::controller::{service_factory, ActionResult, Controller};
use quickrouter::plugin::{HookResult, Plugin, PluginRejection};
use quickrouter::registry::{ServiceEntry, ServiceRegistry};
use quickrouter::request::{ActionArgs, RouteRequest};
use quickrouter::response::Response;
use quickrouter::SharedController;

/// A controller exposing one action of each interesting shape.
pub struct EchoController;

impl Controller for EchoController {
    fn has_action(&self, action: &str) -> bool {
        matches!(action, "index" | "test" | "echo" | "fail" | "created")
    }

    fn invoke(&mut self, action: &str, args: &ActionArgs) -> anyhow::Result<ActionResult> {
        match action {
            "index" => Ok(json!("index").into()),
            "test" => Ok(json!("This is a test service.").into()),
            "echo" => {
                let named: Value = args
                    .named()
                    .iter()
                    .cloned()
                    .collect::<serde_json::Map<String, Value>>()
                    .into();
                Ok(json!({
                    "positional": args.positional(),
                    "named": named,
                })
                .into())
            }
            "fail" => Err(anyhow::anyhow!("A generic exception.")),
            "created" => Ok(Response::with_status(json!({"id": 1}), 201).into()),
            other => Err(anyhow::anyhow!("unknown action '{}'", other)),
        }
    }
}

/// A registry with `EchoController` registered under the given keys.
pub fn echo_registry(keys: &[&str]) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry.register_factory("EchoController", service_factory(|| EchoController));
    for key in keys {
        registry.register(*key, ServiceEntry::Class("EchoController".into()));
    }
    registry
}

/// Shared, clonable call log written to by [`RecordingPlugin`].
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Appends each hook it sees to a shared log.
pub struct RecordingPlugin {
    pub name: &'static str,
    pub log: CallLog,
}

impl RecordingPlugin {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: Rc::clone(log),
        }
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, hook));
    }
}

impl Plugin for RecordingPlugin {
    fn after_handler_selected(&mut self, _request: &RouteRequest) -> HookResult {
        self.record("after_handler_selected");
        Ok(())
    }

    fn before_controller_selected(&mut self, _request: &RouteRequest) -> HookResult {
        self.record("before_controller_selected");
        Ok(())
    }

    fn after_controller_selected(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
    ) -> HookResult {
        self.record("after_controller_selected");
        Ok(())
    }

    fn before_action_invoked(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
    ) -> HookResult {
        self.record("before_action_invoked");
        Ok(())
    }

    fn after_action_invoked(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
        _result: &ActionResult,
    ) -> HookResult {
        self.record("after_action_invoked");
        Ok(())
    }
}

/// Rejects the request at one named hook, passing every other hook.
pub struct RejectingPlugin {
    pub hook: &'static str,
    pub rejection: PluginRejection,
}

impl RejectingPlugin {
    pub fn new(hook: &'static str, rejection: PluginRejection) -> Self {
        Self { hook, rejection }
    }

    fn guard(&self, hook: &str) -> HookResult {
        if self.hook == hook {
            Err(self.rejection.clone())
        } else {
            Ok(())
        }
    }
}

impl Plugin for RejectingPlugin {
    fn after_handler_selected(&mut self, _request: &RouteRequest) -> HookResult {
        self.guard("after_handler_selected")
    }

    fn before_controller_selected(&mut self, _request: &RouteRequest) -> HookResult {
        self.guard("before_controller_selected")
    }

    fn after_controller_selected(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
    ) -> HookResult {
        self.guard("after_controller_selected")
    }

    fn before_action_invoked(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
    ) -> HookResult {
        self.guard("before_action_invoked")
    }

    fn after_action_invoked(
        &mut self,
        _request: &RouteRequest,
        _controller: &SharedController,
        _action: &str,
        _result: &ActionResult,
    ) -> HookResult {
        self.guard("after_action_invoked")
    }
}

/// A controller that counts invocations through a shared cell.
pub struct CountingController {
    pub invocations: Rc<RefCell<u32>>,
}

impl Controller for CountingController {
    fn has_action(&self, action: &str) -> bool {
        action == "index"
    }

    fn invoke(&mut self, _action: &str, _args: &ActionArgs) -> anyhow::Result<ActionResult> {
        *self.invocations.borrow_mut() += 1;
        Ok(json!("counted").into())
    }
}
