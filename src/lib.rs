//! Activity Audit Library
//!
//! This crate provides an audit-event capture layer that sits between
//! application mutation/request flows and durable log storage: custom
//! severities for audit traffic, a safe serializer that never fails,
//! CRUD and request/response record builders with end-to-end timing, an
//! instrumented external service client base, and per-channel JSON-lines
//! sinks with rotation.

pub mod config;
pub mod context;
pub mod emit;
pub mod error;
pub mod external;
pub mod model;
pub mod request;
pub mod sanitize;
pub mod serialize;
pub mod severity;
pub mod usage;
