//! Inbound request descriptors.
//!
//! Two layers of request exist in the dispatch core:
//!
//! - [`RawRequest`] is the transport-level descriptor handed to the
//!   dispatcher: either an HTTP path/query/verb/body tuple or a CLI argv
//!   list. Handlers inspect it in `is_appropriate`.
//! - [`RouteRequest`] is the resolved descriptor a handler builds when it
//!   claims a request: controller key, action name, verb and the extracted
//!   parameter list. It is created once per inbound call and never mutated
//!   afterwards.

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::errors::RouteError;

/// Maximum number of extracted route parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated positional parameter storage.
pub type ParamVec = SmallVec<[Value; MAX_INLINE_PARAMS]>;

/// Stack-allocated named parameter storage, preserving insertion order.
pub type NamedParamVec = SmallVec<[(String, Value); MAX_INLINE_PARAMS]>;

/// A raw, transport-agnostic inbound request.
#[derive(Debug, Clone)]
pub enum RawRequest {
    /// An inbound HTTP request.
    Http(HttpRequest),
    /// An inbound command-line invocation.
    Cli(CliInvocation),
}

/// The HTTP flavour of [`RawRequest`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The URL path (no query string).
    pub path: String,
    /// Query parameters as a key/value map.
    pub query: HashMap<String, String>,
    /// The HTTP verb.
    pub method: Method,
    /// Optional decoded request body.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a request from already-separated parts.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: HashMap<String, String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            path: path.into(),
            query,
            method,
            body,
        }
    }

    /// Create a request from a full request URI, splitting off and decoding
    /// the query string (e.g. `/users/1?expand=posts`).
    pub fn from_uri(method: Method, uri: &str, body: Option<Value>) -> Self {
        let (path, query_str) = match uri.split_once('?') {
            Some((p, q)) => (p, q),
            None => (uri, ""),
        };
        let query: HashMap<String, String> = url::form_urlencoded::parse(query_str.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self::new(method, path, query, body)
    }
}

/// The command-line flavour of [`RawRequest`]: an argv-style flag list.
///
/// The first element is expected to be the program name, as handed to a
/// process by the operating system.
#[derive(Debug, Clone)]
pub struct CliInvocation {
    /// The argv list, program name included.
    pub argv: Vec<String>,
}

impl CliInvocation {
    /// Wrap an argv list.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }
}

impl RawRequest {
    /// Shorthand for an HTTP raw request.
    pub fn http(request: HttpRequest) -> Self {
        RawRequest::Http(request)
    }

    /// Shorthand for a CLI raw request.
    pub fn cli<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawRequest::Cli(CliInvocation::new(argv))
    }
}

/// Parse a case-insensitive HTTP verb string into a [`Method`].
pub fn method_from_verb(verb: &str) -> Result<Method, RouteError> {
    Method::from_bytes(verb.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| RouteError::Handler(format!("invalid HTTP verb '{}'", verb)))
}

/// The ordered parameter list passed to an invoked action.
///
/// Positional parameters come from path segments (or a REST object id);
/// named parameters come from CLI flags and the REST `apiVersion` key.
/// Both lists preserve insertion order.
#[derive(Debug, Clone, Default)]
pub struct ActionArgs {
    positional: ParamVec,
    named: NamedParamVec,
}

impl ActionArgs {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional parameter.
    pub fn push(&mut self, value: Value) {
        self.positional.push(value);
    }

    /// Append a named parameter.
    pub fn push_named(&mut self, name: impl Into<String>, value: Value) {
        self.named.push((name.into(), value));
    }

    /// The positional parameters in order.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The named parameters in declaration order.
    #[must_use]
    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }

    /// Look up a named parameter, last write wins.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Total number of parameters, positional and named.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// True if no parameters were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// The resolved request descriptor built by the handler that claimed an
/// inbound call.
///
/// Read by plugins and by the invocation step; immutable after creation.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    controller: String,
    action: String,
    method: Option<Method>,
    args: ActionArgs,
}

impl RouteRequest {
    /// Build a resolved descriptor. `method` is `None` for CLI invocations.
    pub fn new(
        controller: impl Into<String>,
        action: impl Into<String>,
        method: Option<Method>,
        args: ActionArgs,
    ) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            method,
            args,
        }
    }

    /// The controller (or task) registry key.
    #[must_use]
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// The resolved action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The HTTP verb, or `None` for CLI invocations.
    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The extracted parameter list.
    #[must_use]
    pub fn args(&self) -> &ActionArgs {
        &self.args
    }
}
