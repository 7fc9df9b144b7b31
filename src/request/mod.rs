//! Inbound request auditing.
//!
//! A begin/end token pair (or the `observe` closure wrapper) around one
//! request/response cycle, producing `RequestAuditRecord`s on the
//! `audit.request` channel with `request_type = "internal"`.

mod filter;
mod middleware;
mod record;

pub use filter::PathFilter;
pub use middleware::{Outcome, RequestAudit, RequestToken};
pub use record::{RequestAuditRecord, RequestInfo, ResponseInfo};
