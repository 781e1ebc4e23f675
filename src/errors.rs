use std::fmt;

use crate::plugin::PluginRejection;

/// Failure kinds produced by the dispatch core.
///
/// The variants map one-to-one onto the outcomes a caller can observe:
///
/// - [`RouteError::Configuration`] - a configured handler, plugin or service
///   class cannot be instantiated. Raised at construction time; it indicates
///   a deployment error, never a per-request condition.
/// - [`RouteError::Handler`] - a per-request routing failure (service
///   resolution or action lookup). The message always carries the original
///   cause's text; callers cannot distinguish the root cause from the
///   wrapper alone.
/// - [`RouteError::PluginRejection`] - a plugin hook rejected the request
///   (typically authentication). Carries its own status code and propagates
///   unwrapped.
/// - [`RouteError::Action`] - the target action itself failed. Propagates to
///   the outer dispatch boundary for top-level handling.
/// - [`RouteError::Encoding`] - the active encoder cannot represent the
///   response payload.
#[derive(Debug)]
pub enum RouteError {
    /// A configured class cannot be loaded or instantiated (fatal).
    Configuration(String),
    /// A recoverable per-request handler failure, wrapping the original cause.
    Handler(String),
    /// A plugin hook rejected the request with an explicit status code.
    PluginRejection {
        /// The numeric status code attached by the rejecting plugin.
        status: u16,
        /// Human-readable rejection message.
        message: String,
    },
    /// An uncaught failure raised by the invoked action.
    Action(anyhow::Error),
    /// The response payload cannot be represented by the active encoder.
    Encoding(String),
}

impl RouteError {
    /// The status code to report for this failure.
    ///
    /// Plugin rejections carry their own code; every other kind maps to 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RouteError::PluginRejection { status, .. } => *status,
            _ => 500,
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Configuration(msg) => {
                write!(f, "configuration error: {}", msg)
            }
            RouteError::Handler(msg) => write!(f, "{}", msg),
            RouteError::PluginRejection { message, .. } => write!(f, "{}", message),
            RouteError::Action(err) => write!(f, "{}", err),
            RouteError::Encoding(msg) => write!(f, "unable to encode response: {}", msg),
        }
    }
}

impl std::error::Error for RouteError {}

impl From<PluginRejection> for RouteError {
    fn from(rejection: PluginRejection) -> Self {
        RouteError::PluginRejection {
            status: rejection.status,
            message: rejection.message,
        }
    }
}
