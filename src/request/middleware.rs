//! Inbound request instrumentation.
//!
//! Wraps one request/response cycle with a begin/end token pair (or the
//! `observe` closure form) and emits exactly one `RequestAuditRecord`
//! through `audit.request` at API severity, whether the handler completes
//! or fails. The audit layer observes; it never swallows handler errors.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::context::{self, Principal};
use crate::emit::Channel;

use super::filter::PathFilter;
use super::record::{RequestAuditRecord, RequestInfo, ResponseInfo};

/// Outcome of a wrapped request cycle.
pub enum Outcome<'a> {
    /// The handler completed and produced a response.
    Completed(&'a ResponseInfo),
    /// The handler failed; the error is recorded and must still be
    /// propagated to the original caller by the host.
    Failed(&'a dyn fmt::Display),
}

/// In-flight request capture, returned by [`RequestAudit::begin`].
///
/// Holds the monotonic start instant and the sanitized request
/// representation; local to one request, never shared across calls.
pub struct RequestToken {
    started: Instant,
    protocol: String,
    request_repr: Map<String, Value>,
}

/// Instruments inbound requests.
pub struct RequestAudit {
    channel: Arc<Channel>,
    service_name: String,
    filter: PathFilter,
}

impl RequestAudit {
    pub fn new(channel: Arc<Channel>, service_name: impl Into<String>) -> Self {
        Self {
            channel,
            service_name: service_name.into(),
            filter: PathFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Start auditing one request.
    ///
    /// Captures the start instant and the sanitized request
    /// representation. Returns `None` when the path is filtered out; the
    /// host then skips the matching [`end`](Self::end) call.
    pub fn begin(&self, request: &RequestInfo) -> Option<RequestToken> {
        if !self.filter.should_audit(&request.path) {
            return None;
        }

        Some(RequestToken {
            started: Instant::now(),
            protocol: request.protocol.clone(),
            request_repr: request.repr(),
        })
    }

    /// Finish auditing one request and emit the record.
    ///
    /// Runs on every exit path, including failures and cancellations.
    /// The principal is read here, after authentication has happened.
    pub fn end(&self, token: RequestToken, principal: Option<&dyn Principal>, outcome: Outcome<'_>) {
        let execution_time = token.started.elapsed().as_secs_f64();
        let (user_id, user_info) = context::extract(principal);

        let mut request_repr = token.request_repr;
        request_repr.insert(
            "user".to_string(),
            match &user_id {
                Some(id) => Value::String(id.clone()),
                None => Value::Null,
            },
        );

        let (response_repr, error_message) = match outcome {
            Outcome::Completed(response) => (Some(Value::Object(response.repr())), None),
            Outcome::Failed(error) => (None, Some(error.to_string())),
        };

        let record = RequestAuditRecord {
            service_name: self.service_name.clone(),
            protocol: token.protocol,
            user_id,
            user_info,
            request_repr: Value::Object(request_repr),
            response_repr,
            error_message,
            execution_time,
        };

        self.channel.emit("Audit internal request", record.payload());
    }

    /// Run a handler under audit, guaranteeing `end` on every exit path.
    ///
    /// The handler's result is returned unchanged: a failing handler is
    /// recorded and its error handed back to the caller untouched.
    pub fn observe<E, F>(
        &self,
        request: &RequestInfo,
        principal: Option<&dyn Principal>,
        handler: F,
    ) -> Result<ResponseInfo, E>
    where
        E: fmt::Display,
        F: FnOnce() -> Result<ResponseInfo, E>,
    {
        let token = self.begin(request);
        let result = handler();

        if let Some(token) = token {
            match &result {
                Ok(response) => self.end(token, principal, Outcome::Completed(response)),
                Err(error) => self.end(token, principal, Outcome::Failed(error)),
            }
        }

        result
    }
}
