//! Severity-bound channels.
//!
//! A channel pairs a name (`audit.model`, `audit.request`) with one
//! severity and one sink. Emission builds the JSON-line envelope and
//! writes exactly one line; a failing sink is reported through the
//! crate's diagnostic stream and never surfaces to the caller.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::error;

use crate::severity::Severity;

use super::sink::Sink;

/// Channel name for model mutation events.
pub const MODEL_CHANNEL: &str = "audit.model";

/// Channel name for request and external call events.
pub const REQUEST_CHANNEL: &str = "audit.request";

/// Channel name for login/logout usage events.
pub const LOGIN_CHANNEL: &str = "audit.login";

/// A named logging destination bound to one severity and one sink.
pub struct Channel {
    name: String,
    severity: Severity,
    sink: Arc<dyn Sink>,
}

impl Channel {
    pub fn new(name: impl Into<String>, severity: Severity, sink: Arc<dyn Sink>) -> Self {
        Self {
            name: name.into(),
            severity,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Emit one record through this channel.
    ///
    /// The envelope always carries `timestamp` (millisecond precision),
    /// `level`, `name`, and `message`; the payload fields follow in the
    /// order given. Audit emission must never become a new caller-visible
    /// error, so sink failures are logged and swallowed here.
    pub fn emit(&self, message: &str, payload: Map<String, Value>) {
        let mut record = Map::new();
        record.insert("timestamp".to_string(), Value::String(timestamp_millis()));
        record.insert(
            "level".to_string(),
            Value::String(self.severity.name().to_string()),
        );
        record.insert("name".to_string(), Value::String(self.name.clone()));
        record.insert("message".to_string(), Value::String(message.to_string()));
        record.extend(payload);

        let line = match serde_json::to_string(&Value::Object(record)) {
            Ok(line) => line,
            Err(e) => {
                error!(channel = %self.name, error = %e, "Failed to encode audit record");
                return;
            }
        };

        if let Err(e) = self.sink.write_line(&line) {
            error!(channel = %self.name, error = %e, "Failed to write audit record");
        }
    }
}

/// Wall-clock timestamp with millisecond precision,
/// e.g. `2025-08-16 17:06:32.403`.
fn timestamp_millis() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
