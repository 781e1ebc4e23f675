//! CLI task handler.
//!
//! Routes command-line invocations of the form
//! `program --task Name --action name [--flag value]...` to a registered
//! task. The handler claims an invocation only when a `--task` flag is
//! present and its own service registry can resolve that key; everything
//! else falls through to the "no CLI handler registered" outcome.

use clap::{Arg, ArgAction, Command};
use serde_json::Value;
use tracing::debug;

use super::{Invoker, RouteHandler};
use crate::errors::RouteError;
use crate::plugin::Plugin;
use crate::registry::ServiceRegistry;
use crate::request::{ActionArgs, RawRequest, RouteRequest};
use crate::response::RouteOutcome;

/// The flag naming the task to run.
pub const FLAG_TASK: &str = "task";
/// The flag naming the action to invoke on the task.
pub const FLAG_ACTION: &str = "action";
/// The action used when `--action` is absent.
const DEFAULT_ACTION: &str = "index";

/// A parsed CLI invocation: task key, action name and pass-through flags.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedInvocation {
    task: String,
    action: String,
    flags: Vec<(String, String)>,
}

/// Parse an argv list with a `Command` built dynamically from the long
/// flags it actually contains, so arbitrary `--flag value` pairs are
/// accepted alongside `--task`/`--action`.
///
/// Returns `None` when `--task` is absent or the flag list is malformed
/// (e.g. a flag without a value).
fn parse_argv(argv: &[String]) -> Option<ParsedInvocation> {
    let mut keys: Vec<String> = Vec::new();
    for arg in argv {
        if let Some(key) = arg.strip_prefix("--") {
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    if !keys.iter().any(|k| k == FLAG_TASK) {
        return None;
    }

    // Flags pass through verbatim, so clap's auto-generated --help must
    // not claim the `help` id; a `--help value` pair is just another flag.
    let mut command = Command::new("task")
        .no_binary_name(false)
        .disable_help_flag(true);
    for key in &keys {
        command = command.arg(
            Arg::new(key.clone())
                .long(key.clone())
                .action(ArgAction::Set)
                .num_args(1),
        );
    }
    let matches = command.try_get_matches_from(argv).ok()?;

    let task = matches.get_one::<String>(FLAG_TASK).cloned()?;
    let action = matches
        .get_one::<String>(FLAG_ACTION)
        .cloned()
        .unwrap_or_else(|| DEFAULT_ACTION.to_string());

    // Remaining flags pass through as named parameters, in argv order.
    let flags = keys
        .iter()
        .filter(|k| k.as_str() != FLAG_TASK && k.as_str() != FLAG_ACTION)
        .filter_map(|k| {
            matches
                .get_one::<String>(k)
                .map(|v| (k.clone(), v.clone()))
        })
        .collect();

    Some(ParsedInvocation {
        task,
        action,
        flags,
    })
}

/// Handles CLI invocations against a handler-local task registry.
pub struct CliTaskHandler {
    invoker: Invoker,
}

impl CliTaskHandler {
    /// Build a CLI task handler around its registry and plugin list.
    pub fn new(registry: ServiceRegistry, plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            invoker: Invoker::new(registry, plugins),
        }
    }

    /// The handler's invocation engine (registry access, claimed request).
    pub fn invoker_mut(&mut self) -> &mut Invoker {
        &mut self.invoker
    }
}

impl RouteHandler for CliTaskHandler {
    fn is_appropriate(&mut self, request: &RawRequest) -> bool {
        let RawRequest::Cli(invocation) = request else {
            return false;
        };
        let Some(parsed) = parse_argv(&invocation.argv) else {
            return false;
        };
        if !self.invoker.registry().is_registered(&parsed.task) {
            debug!(task = %parsed.task, "task is not registered with this handler");
            return false;
        }

        let mut args = ActionArgs::new();
        for (key, value) in parsed.flags {
            args.push_named(key, Value::String(value));
        }

        debug!(task = %parsed.task, action = %parsed.action, "CLI task route extracted");
        self.invoker
            .claim(RouteRequest::new(parsed.task, parsed.action, None, args));
        true
    }

    fn perform_route(&mut self) -> Result<RouteOutcome, RouteError> {
        self.invoker.perform()
    }
}
