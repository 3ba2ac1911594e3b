//! The HTTP client seam.

use async_trait::async_trait;

use crate::context::PropagationContext;
use crate::dispatch::error::ClientFailure;
use crate::dispatch::verb::Verb;
use crate::path::RequestTarget;

/// Result of a single client handler call.
///
/// `Err` is reserved for mechanism failures; domain errors belong in `T`.
pub type ClientResult<T> = Result<T, ClientFailure>;

/// Arguments for GET and OPTIONS.
#[derive(Debug, Clone)]
pub struct ReadRequest<H, T> {
    pub path: RequestTarget,
    pub headers: H,
    pub target_type: T,
}

/// Arguments for POST, PUT, PATCH and DELETE.
#[derive(Debug, Clone)]
pub struct WriteRequest<M, T, Mt, H> {
    pub path: RequestTarget,
    pub message: M,
    pub target_type: T,
    pub media_type: Option<Mt>,
    pub headers: H,
}

/// Arguments for HEAD: no message, target type or media type.
#[derive(Debug, Clone)]
pub struct HeadRequest<H> {
    pub path: RequestTarget,
    pub headers: H,
}

/// A client that can serve the dispatcher's verbs.
///
/// Headers, messages, target types and media types are opaque to the
/// dispatcher and forwarded unchanged. Each handler receives the caller's
/// [`PropagationContext`] explicitly and may read any of its keys.
///
/// Handlers a client does not override report
/// [`ClientFailure::MethodNotFound`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    type Headers: Send + 'static;
    type Message: Send + 'static;
    type TargetType: Send + 'static;
    type MediaType: Send + 'static;
    /// The handler result. May carry domain errors, e.g. `Result<Response, E>`.
    type Output: Send + 'static;

    async fn process_get(
        &self,
        _ctx: PropagationContext,
        _request: ReadRequest<Self::Headers, Self::TargetType>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Get))
    }

    async fn process_post(
        &self,
        _ctx: PropagationContext,
        _request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Post))
    }

    async fn process_put(
        &self,
        _ctx: PropagationContext,
        _request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Put))
    }

    async fn process_patch(
        &self,
        _ctx: PropagationContext,
        _request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Patch))
    }

    async fn process_delete(
        &self,
        _ctx: PropagationContext,
        _request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Delete))
    }

    async fn head(
        &self,
        _ctx: PropagationContext,
        _request: HeadRequest<Self::Headers>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Head))
    }

    async fn process_options(
        &self,
        _ctx: PropagationContext,
        _request: ReadRequest<Self::Headers, Self::TargetType>,
    ) -> ClientResult<Self::Output> {
        Err(ClientFailure::MethodNotFound(Verb::Options))
    }
}
