//! Response body encoders.
//!
//! Encoders turn an in-memory [`Response`] into the serialized body string
//! handed back to the transport layer. They sit at the interface boundary
//! of the core: handlers pick one (the REST handler always forces
//! [`JsonEncoder`]) and call it exactly once per routed request.

use serde_json::Value;

use crate::errors::RouteError;
use crate::response::Response;

/// Converts a response object into its wire-format body string.
pub trait Encoder {
    /// Serialize the response payload.
    ///
    /// Fails with [`RouteError::Encoding`] when the payload is of a type
    /// this encoder cannot represent.
    fn encode(&self, response: &Response) -> Result<String, RouteError>;
}

/// The default pass-through encoder: scalar payloads are rendered as plain
/// text, null as the empty string. Structured payloads are not
/// representable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEncoder;

impl Encoder for NullEncoder {
    fn encode(&self, response: &Response) -> Result<String, RouteError> {
        match response.payload() {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Array(_) => Err(RouteError::Encoding(
                "cannot encode an array payload as plain text".into(),
            )),
            Value::Object(_) => Err(RouteError::Encoding(
                "cannot encode an object payload as plain text".into(),
            )),
        }
    }
}

/// Encodes the response payload as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, response: &Response) -> Result<String, RouteError> {
        serde_json::to_string(response.payload())
            .map_err(|e| RouteError::Encoding(e.to_string()))
    }
}
