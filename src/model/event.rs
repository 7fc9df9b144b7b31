//! CRUD audit event types.

use std::fmt;

use serde_json::{Map, Value};

use crate::context::UserContext;

/// Kind of model mutation being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Create,
    Update,
    Delete,
    BulkCreate,
    BulkUpdate,
}

impl EventKind {
    /// Upper-case label as it appears in emitted records.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Create => "CREATE",
            EventKind::Update => "UPDATE",
            EventKind::Delete => "DELETE",
            EventKind::BulkCreate => "BULK_CREATE",
            EventKind::BulkUpdate => "BULK_UPDATE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited model mutation.
///
/// Transient: constructed, serialized, emitted, and discarded within a
/// single notification. `instance_repr` holds the entity's field state at
/// emission time (post-mutation for CREATE/UPDATE, last-known for DELETE)
/// already passed through the safe serializer.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub model: String,
    pub event_type: EventKind,
    pub instance_id: String,
    pub instance_repr: Value,
    pub user_id: Option<String>,
    pub user_info: UserContext,
    pub extra: Value,
}

impl AuditEvent {
    /// Log message for this event.
    pub fn message(&self) -> String {
        format!(
            "{} event for {} (id: {})",
            self.event_type, self.model, self.instance_id
        )
    }

    /// Payload fields in emission order.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("model".to_string(), Value::String(self.model.clone()));
        payload.insert(
            "event_type".to_string(),
            Value::String(self.event_type.as_str().to_string()),
        );
        payload.insert(
            "instance_id".to_string(),
            Value::String(self.instance_id.clone()),
        );
        payload.insert("instance_repr".to_string(), self.instance_repr.clone());
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
        payload.insert("extra".to_string(), self.extra.clone());
        payload
    }
}
