//! Outbound call auditing.
//!
//! A transport capability trait plus a single instrumentation wrapper:
//! any transport (HTTP, SFTP, ...) composes with `ExternalClient` to get
//! per-call `ExternalCallRecord`s on the `audit.request` channel with
//! `request_type = "external"`.

mod client;
mod transport;

pub use client::{ExternalCallRecord, ExternalClient};
pub use transport::{OutboundRequest, OutboundResponse, Transport, TransportError};
