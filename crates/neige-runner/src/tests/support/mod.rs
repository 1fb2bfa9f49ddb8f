//! Test doubles shared by the runner suites.

mod channel;
mod fake_host;
mod reporter;

pub use channel::{
    ScriptedChannel, Sent, Transcript, eval_fetch, invalid_envelope, reply_pairs,
};
pub use fake_host::{FakeHost, HostLog, HostScript};
pub use reporter::{HealthEvent, RecordingHealthReporter};
