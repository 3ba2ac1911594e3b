//! Dispatch metrics.
//!
//! # Metrics
//! - `dispatch_invocations_total` (counter): calls by handler and outcome
//! - `dispatch_invocation_duration_seconds` (histogram): time spent suspended
//!   in the client handler
//!
//! Without an installed recorder these are no-ops.

use std::time::Instant;

use crate::dispatch::Verb;

/// Record a finished client invocation.
pub fn record_invocation(verb: Verb, outcome: &'static str, start_time: Instant) {
    let handler = verb.handler_name();
    let elapsed = start_time.elapsed().as_secs_f64();

    metrics::counter!(
        "dispatch_invocations_total",
        "handler" => handler,
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!("dispatch_invocation_duration_seconds", "handler" => handler)
        .record(elapsed);
}
