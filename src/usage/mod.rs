//! Login/usage event capture.
//!
//! Records authentication lifecycle events (login, logout, failed
//! attempts) as `UsageRecord`s on the `audit.login` channel at LOGIN
//! severity, separate from CRUD and request auditing.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::{self, Principal, UserContext};
use crate::emit::Channel;
use crate::serialize::{serialize, RawValue};

/// One audited usage event.
///
/// Transient like the other record types: built, emitted, and discarded
/// within a single notification. `error` is empty on success.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub user_id: Option<String>,
    pub user_info: UserContext,
    /// Event label, e.g. "login" or "logout".
    pub event: String,
    pub success: bool,
    pub error: String,
    pub extra: Value,
}

impl UsageRecord {
    /// Payload fields in emission order.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
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
        payload.insert("event".to_string(), Value::String(self.event.clone()));
        payload.insert("success".to_string(), Value::Bool(self.success));
        payload.insert("error".to_string(), Value::String(self.error.clone()));
        payload.insert("extra".to_string(), self.extra.clone());
        payload
    }
}

/// Builder and emitter for usage events.
///
/// Driven by the host's authentication flow: one call per login/logout
/// attempt, one log write, no retries.
pub struct UsageAudit {
    channel: Arc<Channel>,
}

impl UsageAudit {
    pub fn new(channel: Arc<Channel>) -> Self {
        Self { channel }
    }

    /// Record one usage event and emit it at LOGIN severity through
    /// `audit.login`.
    ///
    /// `error` carries the failure description for unsuccessful attempts
    /// and is empty otherwise. `extra` holds caller-supplied context such
    /// as an identity-provider id or a status code.
    pub fn record(
        &self,
        message: &str,
        event: &str,
        success: bool,
        error: &str,
        principal: Option<&dyn Principal>,
        extra: Vec<(String, RawValue)>,
    ) -> UsageRecord {
        let (user_id, user_info) = context::extract(principal);
        let extra = if extra.is_empty() {
            Value::Object(Map::new())
        } else {
            serialize(&RawValue::Map(extra))
        };

        let record = UsageRecord {
            user_id,
            user_info,
            event: event.to_string(),
            success,
            error: error.to_string(),
            extra,
        };

        self.channel.emit(message, record.payload());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{MemorySink, Sink, LOGIN_CHANNEL};
    use crate::severity::Severity;
    use serde_json::json;

    struct Actor;

    impl Principal for Actor {
        fn id(&self) -> Option<String> {
            Some("u-5".to_string())
        }
        fn email(&self) -> Option<String> {
            Some("u5@example.com".to_string())
        }
    }

    fn audit_with_sink() -> (UsageAudit, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let channel = Arc::new(Channel::new(
            LOGIN_CHANNEL,
            Severity::Login,
            sink.clone() as Arc<dyn Sink>,
        ));
        (UsageAudit::new(channel), sink)
    }

    #[test]
    fn test_successful_login_record() {
        let (audit, sink) = audit_with_sink();

        audit.record(
            "User login",
            "login",
            true,
            "",
            Some(&Actor),
            vec![("status_code".to_string(), 200i64.into())],
        );

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let record: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record["level"], "LOGIN");
        assert_eq!(record["name"], "audit.login");
        assert_eq!(record["message"], "User login");
        assert_eq!(record["event"], "login");
        assert_eq!(record["success"], true);
        assert_eq!(record["error"], "");
        assert_eq!(record["user_id"], "u-5");
        assert_eq!(record["user_info"]["email"], "u5@example.com");
        assert_eq!(record["extra"], json!({"status_code": 200}));
    }

    #[test]
    fn test_failed_login_carries_error() {
        let (audit, sink) = audit_with_sink();

        audit.record(
            "User login",
            "login",
            false,
            "invalid credentials",
            None,
            Vec::new(),
        );

        let record: Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(record["success"], false);
        assert_eq!(record["error"], "invalid credentials");
        assert_eq!(record["user_id"], Value::Null);
        assert_eq!(record["extra"], json!({}));
    }

    #[test]
    fn test_payload_field_order() {
        let record = UsageRecord {
            user_id: None,
            user_info: UserContext::default(),
            event: "logout".to_string(),
            success: true,
            error: String::new(),
            extra: json!({}),
        };
        let keys: Vec<String> = record.payload().keys().cloned().collect();
        assert_eq!(
            keys,
            ["user_id", "user_info", "event", "success", "error", "extra"]
        );
    }
}
