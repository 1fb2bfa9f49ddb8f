//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use neige_rpc::{ChannelId, Endpoint};

use crate::dispatch::{DispatchError, DispatchSummary};
use crate::health::HealthReporter;
use crate::process::LaunchError;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    AttachStarting(String),
    Attached(u64),
    RegistrationSucceeded(String),
    StartupFailed(String),
    WorkerStarted,
    WorkerStopped(DispatchSummary),
    WorkerFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn attach_starting(&self, endpoint: &Endpoint) {
        self.record(HealthEvent::AttachStarting(endpoint.to_string()));
    }

    fn attached(&self, channel_id: ChannelId) {
        self.record(HealthEvent::Attached(channel_id.get()));
    }

    fn registration_succeeded(&self, extension: &str) {
        self.record(HealthEvent::RegistrationSucceeded(extension.to_owned()));
    }

    fn startup_failed(&self, error: &LaunchError) {
        self.record(HealthEvent::StartupFailed(error.to_string()));
    }

    fn worker_started(&self) {
        self.record(HealthEvent::WorkerStarted);
    }

    fn worker_stopped(&self, summary: &DispatchSummary) {
        self.record(HealthEvent::WorkerStopped(*summary));
    }

    fn worker_failed(&self, error: &DispatchError) {
        self.record(HealthEvent::WorkerFailed(error.to_string()));
    }
}
