//! Resource request dispatch for HTTP clients.
//!
//! Builds request targets from typed path segments and query parameters,
//! captures the caller's propagation context, and dispatches each verb to
//! an [`HttpClient`] implementation while the caller's task awaits.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod observability;
pub mod path;
pub mod transport;

pub use config::DispatchConfig;
pub use context::{CallerContext, CallingUnit, PropagationContext, PropagationKey};
pub use dispatch::{Dispatcher, HttpClient, InvocationError};
pub use path::{RequestTarget, ResourcePath};
