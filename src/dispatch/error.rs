//! Dispatch error types.

use thiserror::Error;

use crate::dispatch::verb::Verb;

/// A failure of the call mechanism itself, as opposed to a domain error
/// the client returns as part of its output.
#[derive(Debug, Error)]
pub enum ClientFailure {
    /// The client has no handler for the verb.
    #[error("no such method '{}'", .0.handler_name())]
    MethodNotFound(Verb),

    /// The handler panicked instead of returning.
    #[error("{0}")]
    Panicked(String),

    /// Any other runtime-level failure raised by the client.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ClientFailure {
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ClientFailure::Other(error.into())
    }
}

/// Wraps a [`ClientFailure`] raised while dispatching to the client.
#[derive(Debug, Error)]
#[error("client method invocation failed: {source}")]
pub struct InvocationError {
    verb: Verb,
    #[source]
    source: ClientFailure,
}

impl InvocationError {
    pub fn new(verb: Verb, source: ClientFailure) -> Self {
        Self { verb, source }
    }

    /// The verb whose dispatch failed.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn failure(&self) -> &ClientFailure {
        &self.source
    }

    pub fn into_failure(self) -> ClientFailure {
        self.source
    }
}
