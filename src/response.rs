//! Response values and dispatch outcomes.

use http::StatusCode;
use serde_json::Value;

/// A response produced by an invoked action, or synthesized by the handler
/// when the action returns a bare value.
///
/// Wraps an arbitrary payload plus a numeric status code (200 by default).
/// Consumed exactly once by the serialization step; immutable after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    payload: Value,
    status: u16,
}

impl Response {
    /// Wrap a payload with the default success status.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self::with_status(payload, StatusCode::OK.as_u16())
    }

    /// Wrap a payload with an explicit status code.
    #[must_use]
    pub fn with_status(payload: Value, status: u16) -> Self {
        Self { payload, status }
    }

    /// The wrapped payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The numeric status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }
}

/// The final, already-serialized result of a routed request: a body string
/// plus the out-of-band status code for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Numeric status code to signal to the transport.
    pub status: u16,
    /// Serialized response body.
    pub body: String,
}

impl RouteOutcome {
    /// An outcome with an empty body.
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}
