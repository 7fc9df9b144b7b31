//! Configuration for the audit pipeline.
//!
//! Handles loading and validating settings from TOML files and wiring
//! channels, sinks, and capture components together.

mod pipeline;
mod settings;

pub use pipeline::AuditPipeline;
pub use settings::{ChannelConfig, ChannelsConfig, FiltersConfig, Settings};
