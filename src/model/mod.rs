//! CRUD event capture.
//!
//! Turns the host persistence layer's change notifications into
//! `AuditEvent` records on the `audit.model` channel at AUDIT severity.

mod builder;
mod event;

pub use builder::ModelAudit;
pub use event::{AuditEvent, EventKind};
