//! Verb dispatch into the HTTP client.
//!
//! # Data Flow
//! ```text
//! Dispatcher::get / post / ... (direct path or ResourcePath)
//!     → RequestTarget (one representation for both call forms)
//!     → PropagationContext::capture (before suspending)
//!     → HttpClient::process_* (awaited; the caller's task yields)
//!     → Output unchanged, or InvocationError for mechanism failures
//! ```
//!
//! # Design Decisions
//! - Domain errors are part of the client's `Output` and pass through untouched
//! - Failures of the call itself (missing handler, panic, runtime error) are
//!   wrapped in a single `InvocationError`
//! - No retries, timeouts or cancellation here; those belong to the client

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod verb;

pub use client::{ClientResult, HeadRequest, HttpClient, ReadRequest, WriteRequest};
pub use dispatcher::Dispatcher;
pub use error::{ClientFailure, InvocationError};
pub use verb::Verb;
