//! Instrumented external service client.
//!
//! Every verb-shaped helper routes through a single instrumented call
//! path: start instant, transport call, record build, emission, and
//! unchanged propagation of the transport's result.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::context::{self, Principal, UserContext};
use crate::emit::Channel;
use crate::serialize::RawValue;

use super::transport::{OutboundRequest, OutboundResponse, Transport, TransportError};

/// One audited outbound service call, `request_type = "external"`.
#[derive(Debug, Clone)]
pub struct ExternalCallRecord {
    pub service_name: String,
    pub protocol: String,
    pub user_id: Option<String>,
    pub user_info: UserContext,
    pub request_repr: Value,
    pub response_repr: Option<Value>,
    pub error_message: Option<String>,
    pub execution_time: f64,
}

impl ExternalCallRecord {
    /// Payload fields in emission order.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "service_name".to_string(),
            Value::String(self.service_name.clone()),
        );
        payload.insert(
            "request_type".to_string(),
            Value::String("external".to_string()),
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

/// Audited client over any [`Transport`].
///
/// The service name is fixed at construction; records flow through the
/// same `audit.request` channel as inbound requests, distinguished by
/// `request_type = "external"`.
pub struct ExternalClient<T: Transport> {
    service_name: String,
    transport: T,
    channel: Arc<Channel>,
}

impl<T: Transport> ExternalClient<T> {
    pub fn new(service_name: impl Into<String>, transport: T, channel: Arc<Channel>) -> Self {
        Self {
            service_name: service_name.into(),
            transport,
            channel,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Perform one instrumented call.
    ///
    /// Measures the transport end-to-end, emits exactly one record
    /// whether the call succeeds or fails, and returns the transport's
    /// result unchanged.
    pub fn call(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        self.call_as(request, None)
    }

    /// Like [`call`](Self::call), attaching an acting principal to the
    /// record for calls made on a user's behalf.
    pub fn call_as(
        &self,
        request: OutboundRequest,
        principal: Option<&dyn Principal>,
    ) -> Result<OutboundResponse, TransportError> {
        let started = Instant::now();
        let request_repr = Value::Object(request.repr());

        let result = self.transport.perform(&request);
        let execution_time = started.elapsed().as_secs_f64();

        let (user_id, user_info) = context::extract(principal);
        let (response_repr, error_message) = match &result {
            Ok(response) => (Some(Value::Object(response.repr())), None),
            Err(error) => (None, Some(error.to_string())),
        };

        let record = ExternalCallRecord {
            service_name: self.service_name.clone(),
            protocol: self.transport.protocol().to_string(),
            user_id,
            user_info,
            request_repr,
            response_repr,
            error_message,
            execution_time,
        };

        self.channel.emit("Audit external request", record.payload());

        result
    }

    pub fn get(&self, endpoint: &str) -> Result<OutboundResponse, TransportError> {
        self.call(OutboundRequest::new("GET", endpoint))
    }

    pub fn post(
        &self,
        endpoint: &str,
        body: impl Into<RawValue>,
    ) -> Result<OutboundResponse, TransportError> {
        self.call(OutboundRequest::new("POST", endpoint).with_body(body))
    }

    pub fn put(
        &self,
        endpoint: &str,
        body: impl Into<RawValue>,
    ) -> Result<OutboundResponse, TransportError> {
        self.call(OutboundRequest::new("PUT", endpoint).with_body(body))
    }

    pub fn delete(&self, endpoint: &str) -> Result<OutboundResponse, TransportError> {
        self.call(OutboundRequest::new("DELETE", endpoint))
    }
}
