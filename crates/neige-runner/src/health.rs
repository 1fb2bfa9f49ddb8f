//! Structured health reporting for runner lifecycle events.

use std::sync::Arc;

use neige_rpc::{ChannelId, Endpoint};

use crate::dispatch::{DispatchError, DispatchSummary};
use crate::process::LaunchError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before connecting to the host.
    fn attach_starting(&self, endpoint: &Endpoint);

    /// Invoked once the host has assigned a channel id.
    fn attached(&self, channel_id: ChannelId);

    /// Invoked after the host extension accepted the channel id.
    fn registration_succeeded(&self, extension: &str);

    /// Invoked when any step before the worker starts fails.
    fn startup_failed(&self, error: &LaunchError);

    /// Invoked once the dispatch worker is running.
    fn worker_started(&self);

    /// Invoked when the dispatch loop ends because the host disconnected.
    fn worker_stopped(&self, summary: &DispatchSummary);

    /// Invoked when the dispatch loop ends with a fatal error.
    fn worker_failed(&self, error: &DispatchError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn attach_starting(&self, endpoint: &Endpoint) {
        (**self).attach_starting(endpoint);
    }

    fn attached(&self, channel_id: ChannelId) {
        (**self).attached(channel_id);
    }

    fn registration_succeeded(&self, extension: &str) {
        (**self).registration_succeeded(extension);
    }

    fn startup_failed(&self, error: &LaunchError) {
        (**self).startup_failed(error);
    }

    fn worker_started(&self) {
        (**self).worker_started();
    }

    fn worker_stopped(&self, summary: &DispatchSummary) {
        (**self).worker_stopped(summary);
    }

    fn worker_failed(&self, error: &DispatchError) {
        (**self).worker_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn attach_starting(&self, endpoint: &Endpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "attach_starting",
            endpoint = %endpoint,
            "attaching to host"
        );
    }

    fn attached(&self, channel_id: ChannelId) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "attached",
            channel_id = channel_id.get(),
            "attached to host"
        );
    }

    fn registration_succeeded(&self, extension: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "registration_succeeded",
            extension,
            "host extension registered the channel"
        );
    }

    fn startup_failed(&self, error: &LaunchError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "startup_failed",
            error = %error,
            "runner startup failed"
        );
    }

    fn worker_started(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "worker_started",
            "dispatch worker running"
        );
    }

    fn worker_stopped(&self, summary: &DispatchSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "worker_stopped",
            evaluations = summary.evaluations,
            failed_evaluations = summary.failed_evaluations,
            dropped_notifications = summary.dropped_notifications,
            declined_requests = summary.declined_requests,
            "dispatch worker stopped"
        );
    }

    fn worker_failed(&self, error: &DispatchError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "worker_failed",
            error = %error,
            error_debug = ?error,
            "dispatch worker failed"
        );
    }
}
