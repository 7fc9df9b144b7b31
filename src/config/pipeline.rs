//! Pipeline wiring.
//!
//! Builds channels, sinks, and the builders from settings. This is the
//! configuration glue between the host's settings file and the capture
//! components; the host can equally construct the pieces by hand.

use std::sync::Arc;

use tracing::debug;

use crate::emit::{Channel, FileSink, NullSink, Sink, LOGIN_CHANNEL, MODEL_CHANNEL, REQUEST_CHANNEL};
use crate::error::AuditResult;
use crate::external::{ExternalClient, Transport};
use crate::model::ModelAudit;
use crate::request::{PathFilter, RequestAudit};
use crate::severity::{self, Severity};
use crate::usage::UsageAudit;

use super::settings::{ChannelConfig, Settings};

/// Fully wired audit pipeline.
///
/// Owns the three channels and hands out the capture components bound
/// to them. Construction registers the built-in severities; a registry
/// conflict aborts startup.
pub struct AuditPipeline {
    service_name: String,
    model_channel: Arc<Channel>,
    request_channel: Arc<Channel>,
    login_channel: Arc<Channel>,
    model: ModelAudit,
    request: RequestAudit,
    usage: UsageAudit,
}

impl AuditPipeline {
    /// Build the pipeline from settings, opening file sinks.
    pub fn from_settings(settings: &Settings) -> AuditResult<Self> {
        let model_sink = file_sink(&settings.channels.model)?;
        let request_sink = file_sink(&settings.channels.request)?;
        let login_sink = file_sink(&settings.channels.login)?;
        Self::with_sinks(settings, model_sink, request_sink, login_sink)
    }

    /// Build the pipeline with caller-supplied sinks (tests, console
    /// routing, custom destinations).
    pub fn with_sinks(
        settings: &Settings,
        model_sink: Arc<dyn Sink>,
        request_sink: Arc<dyn Sink>,
        login_sink: Arc<dyn Sink>,
    ) -> AuditResult<Self> {
        severity::init()?;

        let model_channel = Arc::new(Channel::new(MODEL_CHANNEL, Severity::Audit, model_sink));
        let request_channel = Arc::new(Channel::new(REQUEST_CHANNEL, Severity::Api, request_sink));
        let login_channel = Arc::new(Channel::new(LOGIN_CHANNEL, Severity::Login, login_sink));

        let model = ModelAudit::new(Arc::clone(&model_channel))
            .with_skip_models(settings.filters.skip_models.iter().cloned());

        let request = RequestAudit::new(Arc::clone(&request_channel), &settings.service_name)
            .with_filter(PathFilter::new(
                settings.filters.exclude_paths.clone(),
                settings.filters.include_paths.clone(),
            ));

        let usage = UsageAudit::new(Arc::clone(&login_channel));

        debug!(service_name = %settings.service_name, "Audit pipeline initialized");

        Ok(Self {
            service_name: settings.service_name.clone(),
            model_channel,
            request_channel,
            login_channel,
            model,
            request,
            usage,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// CRUD event builder bound to `audit.model`.
    pub fn model(&self) -> &ModelAudit {
        &self.model
    }

    /// Request middleware bound to `audit.request`.
    pub fn request(&self) -> &RequestAudit {
        &self.request
    }

    /// Usage event builder bound to `audit.login`.
    pub fn usage(&self) -> &UsageAudit {
        &self.usage
    }

    pub fn model_channel(&self) -> &Arc<Channel> {
        &self.model_channel
    }

    pub fn request_channel(&self) -> &Arc<Channel> {
        &self.request_channel
    }

    pub fn login_channel(&self) -> &Arc<Channel> {
        &self.login_channel
    }

    /// Build an external client for `service_name` over `transport`,
    /// sharing this pipeline's `audit.request` channel.
    pub fn external_client<T: Transport>(
        &self,
        service_name: impl Into<String>,
        transport: T,
    ) -> ExternalClient<T> {
        ExternalClient::new(service_name, transport, Arc::clone(&self.request_channel))
    }
}

fn file_sink(config: &ChannelConfig) -> AuditResult<Arc<dyn Sink>> {
    if !config.enabled {
        return Ok(Arc::new(NullSink));
    }
    Ok(Arc::new(FileSink::new(
        &config.path,
        config.max_bytes,
        config.backup_count,
    )?))
}
