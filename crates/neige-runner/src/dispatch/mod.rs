//! The dispatch loop and the worker thread that supervises it.
//!
//! The loop owns the host channel, the Lua environment and the reply
//! emitter. It classifies each inbound message, evaluates `eval_fetch`
//! notifications strictly in arrival order, and replies to every one it can
//! correlate. It returns only when the host closes the connection or a reply
//! can no longer be delivered.

mod dispatcher;
mod errors;
mod request;
mod worker;

pub use dispatcher::{DispatchSummary, Dispatcher, ERROR_EVENT, EVAL_FETCH};
pub use errors::DispatchError;
pub use request::{EvalRequest, RequestError};
pub use worker::{DispatchWorker, WORKER_THREAD_NAME};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
