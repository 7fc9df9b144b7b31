//! Request audit record types.

use serde_json::{Map, Value};

use crate::context::UserContext;
use crate::sanitize::{sanitize_headers, sanitize_value};
use crate::serialize::{serialize, RawValue};

/// One inbound request as seen by the audit layer.
///
/// Header and query lists are copied into the record at capture time;
/// the record never aliases the host's live request state.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    /// Transport label, e.g. "http" or "https".
    pub protocol: String,
    pub query_params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RawValue,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            protocol: "http".to_string(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: RawValue::Null,
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<RawValue>) -> Self {
        self.body = body.into();
        self
    }

    /// Sanitized `request_repr` mapping: `{method, path, query_params,
    /// headers, user, body}`. The `user` entry is filled in at emission
    /// time, after authentication has happened.
    pub(crate) fn repr(&self) -> Map<String, Value> {
        let mut repr = Map::new();
        repr.insert("method".to_string(), Value::String(self.method.clone()));
        repr.insert("path".to_string(), Value::String(self.path.clone()));
        repr.insert(
            "query_params".to_string(),
            pairs_to_object(&self.query_params),
        );
        repr.insert(
            "headers".to_string(),
            pairs_to_object(&sanitize_headers(&self.headers)),
        );
        repr.insert("user".to_string(), Value::Null);
        repr.insert("body".to_string(), sanitize_value(&serialize(&self.body)));
        repr
    }
}

/// One outgoing response as seen by the audit layer.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: RawValue,
}

impl ResponseInfo {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
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

    /// Sanitized `response_repr` mapping: `{status_code, headers, body}`.
    pub(crate) fn repr(&self) -> Map<String, Value> {
        let mut repr = Map::new();
        repr.insert(
            "status_code".to_string(),
            Value::Number(self.status_code.into()),
        );
        repr.insert(
            "headers".to_string(),
            pairs_to_object(&sanitize_headers(&self.headers)),
        );
        repr.insert("body".to_string(), sanitize_value(&serialize(&self.body)));
        repr
    }
}

/// One audited request/response cycle, `request_type = "internal"`.
#[derive(Debug, Clone)]
pub struct RequestAuditRecord {
    pub service_name: String,
    pub protocol: String,
    pub user_id: Option<String>,
    pub user_info: UserContext,
    pub request_repr: Value,
    pub response_repr: Option<Value>,
    pub error_message: Option<String>,
    /// Wall-clock seconds from entry to exit, including exception paths.
    pub execution_time: f64,
}

impl RequestAuditRecord {
    /// Payload fields in emission order.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "service_name".to_string(),
            Value::String(self.service_name.clone()),
        );
        payload.insert(
            "request_type".to_string(),
            Value::String("internal".to_string()),
        );
        payload.insert("protocol".to_string(), Value::String(self.protocol.clone()));
        payload.insert(
            "user_id".to_string(),
            match &self.user_id {
                Some(id) => Value::String(id.clone()),
                None => Value::Null,
            },
        );
        payload.insert(
            "user_info".to_string(),
            serde_json::to_value(&self.user_info).unwrap_or(Value::Null),
        );
        payload.insert("request_repr".to_string(), self.request_repr.clone());
        payload.insert(
            "response_repr".to_string(),
            self.response_repr.clone().unwrap_or(Value::Null),
        );
        payload.insert(
            "error_message".to_string(),
            match &self.error_message {
                Some(msg) => Value::String(msg.clone()),
                None => Value::Null,
            },
        );
        payload.insert(
            "execution_time".to_string(),
            serde_json::Number::from_f64(self.execution_time)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        payload
    }
}

pub(crate) fn pairs_to_object(pairs: &[(String, String)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect(),
    )
}
