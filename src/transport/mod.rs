//! Concrete client backends.
//!
//! # Responsibilities
//! - Serve the dispatcher's verbs over a real HTTP stack
//! - Read the propagated context back out on the client side
//!
//! # Design Decisions
//! - Transport and status failures are domain errors in `Output`; the
//!   dispatcher never wraps them
//! - Connection pooling, TLS and wire timeouts are left to reqwest defaults

pub mod reqwest_client;

pub use reqwest_client::{ClientResponse, Payload, ReqwestClient, ReqwestClientError, TargetType};
