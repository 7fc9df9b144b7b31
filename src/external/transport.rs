//! Transport capability for outbound calls.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::sanitize::{sanitize_headers, sanitize_value};
use crate::serialize::{serialize, RawValue};

/// Failure raised by a transport implementation.
///
/// Always recorded in the call's audit record, then handed back to the
/// caller unchanged.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Transport failure: {0}")]
    Other(String),
}

/// One outbound call as seen by the audit layer.
///
/// `method` is the transport's verb: an HTTP method, an SFTP operation
/// name, or whatever the transport defines.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub endpoint: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: RawValue,
}

impl OutboundRequest {
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            headers: Vec::new(),
            body: RawValue::Null,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<RawValue>) -> Self {
        self.body = body.into();
        self
    }

    /// Sanitized `request_repr` mapping: `{endpoint, method, headers, body}`.
    pub(crate) fn repr(&self) -> Map<String, Value> {
        let mut repr = Map::new();
        repr.insert("endpoint".to_string(), Value::String(self.endpoint.clone()));
        repr.insert("method".to_string(), Value::String(self.method.clone()));
        repr.insert(
            "headers".to_string(),
            Value::Object(
                sanitize_headers(&self.headers)
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect(),
            ),
        );
        repr.insert("body".to_string(), sanitize_value(&serialize(&self.body)));
        repr
    }
}

/// Response produced by a transport.
///
/// `status_code` is optional: HTTP transports carry one, SFTP-like
/// transports may not.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status_code: Option<u16>,
    pub body: RawValue,
}

impl OutboundResponse {
    pub fn new(status_code: Option<u16>, body: impl Into<RawValue>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Sanitized `response_repr` mapping: `{status_code, body}`.
    pub(crate) fn repr(&self) -> Map<String, Value> {
        let mut repr = Map::new();
        repr.insert(
            "status_code".to_string(),
            match self.status_code {
                Some(code) => Value::Number(code.into()),
                None => Value::Null,
            },
        );
        repr.insert("body".to_string(), sanitize_value(&serialize(&self.body)));
        repr
    }
}

/// A concrete outbound transport (HTTP, SFTP, ...).
///
/// Implementations perform the actual call; the instrumentation wrapper
/// composes with any of them, so new transports never need to touch the
/// audit path.
pub trait Transport: Send + Sync {
    /// Transport label recorded on every call (e.g., "http", "sftp").
    fn protocol(&self) -> &str;

    /// Perform one call.
    fn perform(&self, request: &OutboundRequest) -> Result<OutboundResponse, TransportError>;
}
