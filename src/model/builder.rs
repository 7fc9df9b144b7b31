//! Builds and emits CRUD audit events from change notifications.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::context::{self, Principal};
use crate::emit::Channel;
use crate::serialize::{serialize, RawValue};

use super::event::{AuditEvent, EventKind};

/// Builder and emitter for model mutation events.
///
/// Driven by the host's change-notification hook: the persistence layer
/// supplies the model name, event kind, instance id, and current field
/// values after a successful mutation. The builder never introspects the
/// entity itself. One log write per notification, no retries.
pub struct ModelAudit {
    channel: Arc<Channel>,
    skip_models: HashSet<String>,
}

impl ModelAudit {
    pub fn new(channel: Arc<Channel>) -> Self {
        Self {
            channel,
            skip_models: HashSet::new(),
        }
    }

    /// Model names for which notifications are silently dropped
    /// (migration bookkeeping, sessions, and the like).
    pub fn with_skip_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Handle one change notification: build the event and emit it at
    /// AUDIT severity through `audit.model`.
    ///
    /// Returns the built event, or `None` when the model is skipped.
    pub fn on_change(
        &self,
        model_name: &str,
        event_type: EventKind,
        instance_id: &str,
        field_values: Vec<(String, RawValue)>,
        actor: Option<&dyn Principal>,
    ) -> Option<AuditEvent> {
        self.on_change_with(
            model_name,
            event_type,
            instance_id,
            field_values,
            actor,
            Vec::new(),
        )
    }

    /// Like [`on_change`](Self::on_change) with caller-supplied extra
    /// context (bulk totals, changed field lists).
    pub fn on_change_with(
        &self,
        model_name: &str,
        event_type: EventKind,
        instance_id: &str,
        field_values: Vec<(String, RawValue)>,
        actor: Option<&dyn Principal>,
        extra: Vec<(String, RawValue)>,
    ) -> Option<AuditEvent> {
        if self.skip_models.contains(model_name) {
            debug!(model = model_name, "Model excluded from auditing");
            return None;
        }

        let (user_id, user_info) = context::extract(actor);
        let instance_repr = serialize(&RawValue::Map(field_values));
        let extra = if extra.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serialize(&RawValue::Map(extra))
        };

        let event = AuditEvent {
            model: model_name.to_string(),
            event_type,
            instance_id: instance_id.to_string(),
            instance_repr,
            user_id,
            user_info,
            extra,
        };

        self.channel.emit(&event.message(), event.payload());
        Some(event)
    }
}
