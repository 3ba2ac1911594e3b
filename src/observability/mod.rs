//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher::invoke produces:
//!     → tracing events (invocation id, handler, target, propagated keys)
//!     → metrics.rs (invocation counters and latency histogram)
//!
//! Consumers:
//!     → logging.rs installs the fmt subscriber (stdout)
//!     → Any `metrics` recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the binary's job
//! - `metrics_enabled = false` stops the dispatcher from calling into metrics.rs
//! - Invocation IDs correlate the dispatch and completion events

pub mod logging;
pub mod metrics;
