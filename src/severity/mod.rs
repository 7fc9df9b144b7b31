//! Severity registry.
//!
//! Defines the AUDIT (21), API (22), and LOGIN (23) severities, positioned
//! between the standard INFO (20) and WARNING (30) levels, and the
//! process-wide write-once table that binds severity names to numeric
//! levels.

mod registry;

pub use registry::{init, level_of, register, Severity, API_LEVEL, AUDIT_LEVEL, LOGIN_LEVEL};
