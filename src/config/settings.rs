//! Configuration settings for the audit pipeline.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{AuditError, AuditResult};

/// Main configuration structure for the audit pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Logical name of the handling service, stamped on request records.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

/// Per-channel file routing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// `audit.model`: CRUD events at AUDIT severity.
    #[serde(default = "default_model_channel")]
    pub model: ChannelConfig,
    /// `audit.request`: request and external call events at API severity.
    #[serde(default = "default_request_channel")]
    pub request: ChannelConfig,
    /// `audit.login`: usage events at LOGIN severity.
    #[serde(default = "default_login_channel")]
    pub login: ChannelConfig,
}

/// One channel's file sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Whether this channel writes anywhere.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Path to the channel's log file.
    pub path: PathBuf,
    /// Rotate once the file would exceed this size (0 disables rotation).
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Number of rotated files to keep.
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

/// What gets audited.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    /// Request path prefixes never audited.
    #[serde(default = "default_exclude_paths")]
    pub exclude_paths: Vec<String>,
    /// When non-empty, only these path prefixes are audited.
    #[serde(default)]
    pub include_paths: Vec<String>,
    /// Model names whose change notifications are dropped.
    #[serde(default)]
    pub skip_models: Vec<String>,
}

// Default value functions
fn default_service_name() -> String {
    "default".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_backup_count() -> usize {
    5
}

fn default_model_channel() -> ChannelConfig {
    ChannelConfig {
        enabled: true,
        path: PathBuf::from("audit_logs/audit.log"),
        max_bytes: default_max_bytes(),
        backup_count: default_backup_count(),
    }
}

fn default_request_channel() -> ChannelConfig {
    ChannelConfig {
        enabled: true,
        path: PathBuf::from("audit_logs/api.log"),
        max_bytes: default_max_bytes(),
        backup_count: default_backup_count(),
    }
}

fn default_login_channel() -> ChannelConfig {
    ChannelConfig {
        enabled: true,
        path: PathBuf::from("audit_logs/login.log"),
        max_bytes: 5 * 1024 * 1024,
        backup_count: default_backup_count(),
    }
}

fn default_exclude_paths() -> Vec<String> {
    vec![
        "/admin/".to_string(),
        "/static/".to_string(),
        "/favicon.ico".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            channels: ChannelsConfig::default(),
            filters: FiltersConfig::default(),
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            model: default_model_channel(),
            request: default_request_channel(),
            login: default_login_channel(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            exclude_paths: default_exclude_paths(),
            include_paths: Vec::new(),
            skip_models: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AuditError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| AuditError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> AuditResult<()> {
        if self.service_name.is_empty() {
            return Err(AuditError::Config {
                message: "service_name must not be empty".to_string(),
            });
        }

        for (name, channel) in [
            ("channels.model", &self.channels.model),
            ("channels.request", &self.channels.request),
            ("channels.login", &self.channels.login),
        ] {
            if channel.path.as_os_str().is_empty() {
                return Err(AuditError::Config {
                    message: format!("{name}.path must not be empty"),
                });
            }
            if channel.max_bytes > 0 && channel.max_bytes < 1024 {
                return Err(AuditError::Config {
                    message: format!(
                        "{name}.max_bytes must be 0 (no rotation) or at least 1024, got {}",
                        channel.max_bytes
                    ),
                });
            }
        }

        Ok(())
    }
}
