//! The verb dispatcher.
//!
//! # Responsibilities
//! - Normalize both call forms (direct path, resource path) to a `RequestTarget`
//! - Capture the caller's propagation context before suspending
//! - Await the client handler and classify its outcome
//!
//! # Design Decisions
//! - Holds only an `Arc` to the client and the main-strand rule; cheap to clone
//! - A panicking handler is reported like any other mechanism failure

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use uuid::Uuid;

use crate::context::{CallingUnit, MainStrandDetector, PropagationContext};
use crate::dispatch::client::{ClientResult, HeadRequest, HttpClient, ReadRequest, WriteRequest};
use crate::dispatch::error::{ClientFailure, InvocationError};
use crate::dispatch::verb::Verb;
use crate::observability::metrics;
use crate::path::{RequestTarget, ResourcePath};

type Message<C> = <C as HttpClient>::Message;
type Headers<C> = <C as HttpClient>::Headers;
type TargetType<C> = <C as HttpClient>::TargetType;
type MediaType<C> = <C as HttpClient>::MediaType;
type Output<C> = <C as HttpClient>::Output;

/// Dispatches verb calls to an [`HttpClient`].
pub struct Dispatcher<C> {
    client: Arc<C>,
    detector: MainStrandDetector,
    metrics_enabled: bool,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            detector: self.detector.clone(),
            metrics_enabled: self.metrics_enabled,
        }
    }
}

impl<C: HttpClient> Dispatcher<C> {
    /// Create a dispatcher using the default main-strand rule.
    pub fn new(client: Arc<C>) -> Self {
        Self::with_detector(client, MainStrandDetector::default())
    }

    pub fn with_detector(client: Arc<C>, detector: MainStrandDetector) -> Self {
        Self {
            client,
            detector,
            metrics_enabled: true,
        }
    }

    /// Turn invocation metrics on or off. On by default.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn detector(&self) -> &MainStrandDetector {
        &self.detector
    }

    // --- GET / OPTIONS ---

    pub async fn get<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        headers: Headers<C>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        let target = path.into();
        let request = ReadRequest {
            path: target.clone(),
            headers,
            target_type,
        };
        self.invoke(caller, Verb::Get, &target, move |ctx| {
            self.client.process_get(ctx, request)
        })
        .await
    }

    pub async fn get_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        headers: Headers<C>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.get(caller, resource.to_target(), headers, target_type).await
    }

    pub async fn options<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        headers: Headers<C>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        let target = path.into();
        let request = ReadRequest {
            path: target.clone(),
            headers,
            target_type,
        };
        self.invoke(caller, Verb::Options, &target, move |ctx| {
            self.client.process_options(ctx, request)
        })
        .await
    }

    pub async fn options_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        headers: Headers<C>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.options(caller, resource.to_target(), headers, target_type).await
    }

    // --- POST / PUT / PATCH / DELETE ---

    pub async fn post<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        let (target, request) = write_request(path, message, headers, media_type, target_type);
        self.invoke(caller, Verb::Post, &target, move |ctx| {
            self.client.process_post(ctx, request)
        })
        .await
    }

    pub async fn post_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.post(caller, resource.to_target(), message, headers, media_type, target_type)
            .await
    }

    pub async fn put<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        let (target, request) = write_request(path, message, headers, media_type, target_type);
        self.invoke(caller, Verb::Put, &target, move |ctx| {
            self.client.process_put(ctx, request)
        })
        .await
    }

    pub async fn put_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.put(caller, resource.to_target(), message, headers, media_type, target_type)
            .await
    }

    pub async fn patch<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        let (target, request) = write_request(path, message, headers, media_type, target_type);
        self.invoke(caller, Verb::Patch, &target, move |ctx| {
            self.client.process_patch(ctx, request)
        })
        .await
    }

    pub async fn patch_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.patch(caller, resource.to_target(), message, headers, media_type, target_type)
            .await
    }

    pub async fn delete<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        let (target, request) = write_request(path, message, headers, media_type, target_type);
        self.invoke(caller, Verb::Delete, &target, move |ctx| {
            self.client.process_delete(ctx, request)
        })
        .await
    }

    pub async fn delete_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        message: Message<C>,
        headers: Headers<C>,
        media_type: Option<MediaType<C>>,
        target_type: TargetType<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.delete(caller, resource.to_target(), message, headers, media_type, target_type)
            .await
    }

    // --- HEAD ---

    pub async fn head<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        path: impl Into<RequestTarget>,
        headers: Headers<C>,
    ) -> Result<Output<C>, InvocationError> {
        let target = path.into();
        let request = HeadRequest {
            path: target.clone(),
            headers,
        };
        self.invoke(caller, Verb::Head, &target, move |ctx| {
            self.client.head(ctx, request)
        })
        .await
    }

    pub async fn head_resource<U: CallingUnit + ?Sized>(
        &self,
        caller: &U,
        resource: &ResourcePath,
        headers: Headers<C>,
    ) -> Result<Output<C>, InvocationError> {
        self.head(caller, resource.to_target(), headers).await
    }

    /// Capture context, await the handler and classify the outcome.
    async fn invoke<U, F, Fut>(
        &self,
        caller: &U,
        verb: Verb,
        target: &RequestTarget,
        call: F,
    ) -> Result<Output<C>, InvocationError>
    where
        U: CallingUnit + ?Sized,
        F: FnOnce(PropagationContext) -> Fut,
        Fut: Future<Output = ClientResult<Output<C>>>,
    {
        let invocation_id = Uuid::new_v4();
        // Must happen before the first await.
        let ctx = PropagationContext::capture(caller, &self.detector);

        tracing::debug!(
            invocation_id = %invocation_id,
            handler = verb.handler_name(),
            target = %target,
            propagated = ?ctx.keys(),
            main_strand = ctx.is_main_strand(),
            "Dispatching client call"
        );

        let start_time = Instant::now();
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| call(ctx))) {
            Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        let failure = match outcome {
            Ok(Ok(output)) => {
                self.record(verb, "completed", start_time);
                tracing::debug!(
                    invocation_id = %invocation_id,
                    handler = verb.handler_name(),
                    elapsed = ?start_time.elapsed(),
                    "Client call completed"
                );
                return Ok(output);
            }
            Ok(Err(failure)) => failure,
            Err(payload) => ClientFailure::Panicked(panic_message(payload.as_ref())),
        };

        self.record(verb, "failed", start_time);
        tracing::warn!(
            invocation_id = %invocation_id,
            handler = verb.handler_name(),
            target = %target,
            error = %failure,
            "Client method invocation failed"
        );
        Err(InvocationError::new(verb, failure))
    }

    fn record(&self, verb: Verb, outcome: &'static str, start_time: Instant) {
        if self.metrics_enabled {
            metrics::record_invocation(verb, outcome, start_time);
        }
    }
}

fn write_request<M, T, Mt, H>(
    path: impl Into<RequestTarget>,
    message: M,
    headers: H,
    media_type: Option<Mt>,
    target_type: T,
) -> (RequestTarget, WriteRequest<M, T, Mt, H>) {
    let target = path.into();
    let request = WriteRequest {
        path: target.clone(),
        message,
        target_type,
        media_type,
        headers,
    };
    (target, request)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "client handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::context::{CallerContext, MainStrandRule, PropagationKey};

    /// What the mock saw for a single call.
    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        handler: &'static str,
        path: String,
        headers: Vec<(String, String)>,
        message: Option<String>,
        media_type: Option<String>,
        target_type: Option<&'static str>,
        keys: Vec<PropagationKey>,
        main_strand: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct DomainError(String);

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<Seen>>,
    }

    impl RecordingClient {
        fn record(
            &self,
            handler: &'static str,
            ctx: &PropagationContext,
            path: &RequestTarget,
            headers: Vec<(String, String)>,
        ) -> Seen {
            let seen = Seen {
                handler,
                path: path.to_string(),
                headers,
                message: None,
                media_type: None,
                target_type: None,
                keys: ctx.keys(),
                main_strand: ctx.is_main_strand(),
            };
            self.calls.lock().unwrap().push(seen.clone());
            seen
        }
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        type Headers = Vec<(String, String)>;
        type Message = String;
        type TargetType = &'static str;
        type MediaType = String;
        type Output = Result<Seen, DomainError>;

        async fn process_get(
            &self,
            ctx: PropagationContext,
            request: ReadRequest<Self::Headers, Self::TargetType>,
        ) -> ClientResult<Self::Output> {
            if request.path.as_str().starts_with("/missing") {
                return Ok(Err(DomainError("404 Not Found".into())));
            }
            let mut seen = self.record("processGet", &ctx, &request.path, request.headers);
            seen.target_type = Some(request.target_type);
            Ok(Ok(seen))
        }

        async fn process_post(
            &self,
            ctx: PropagationContext,
            request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
        ) -> ClientResult<Self::Output> {
            let mut seen = self.record("processPost", &ctx, &request.path, request.headers);
            seen.message = Some(request.message);
            seen.media_type = request.media_type;
            seen.target_type = Some(request.target_type);
            Ok(Ok(seen))
        }

        async fn process_delete(
            &self,
            _ctx: PropagationContext,
            _request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
        ) -> ClientResult<Self::Output> {
            Err(ClientFailure::other("boom"))
        }

        async fn process_patch(
            &self,
            _ctx: PropagationContext,
            _request: WriteRequest<Self::Message, Self::TargetType, Self::MediaType, Self::Headers>,
        ) -> ClientResult<Self::Output> {
            panic!("boom");
        }

        async fn head(
            &self,
            ctx: PropagationContext,
            request: HeadRequest<Self::Headers>,
        ) -> ClientResult<Self::Output> {
            Ok(Ok(self.record("head", &ctx, &request.path, request.headers)))
        }
    }

    fn dispatcher() -> Dispatcher<RecordingClient> {
        Dispatcher::new(Arc::new(RecordingClient::default()))
    }

    #[tokio::test]
    async fn test_get_resource_builds_target() {
        let dispatcher = dispatcher();
        let caller = CallerContext::new();
        let resource = ResourcePath::new(["users"]).segment(7).param("expand", json!(["a", "b"]));

        let seen = dispatcher
            .get_resource(&caller, &resource, vec![("accept".into(), "json".into())], "json")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(seen.handler, "processGet");
        assert_eq!(seen.path, "/users/7?expand=a,b");
        assert_eq!(seen.headers, vec![("accept".to_string(), "json".to_string())]);
        assert_eq!(seen.target_type, Some("json"));
    }

    #[tokio::test]
    async fn test_post_forwards_arguments_unchanged() {
        let dispatcher = dispatcher();
        let caller = CallerContext::new()
            .with_parent_function("onMessage")
            .with_local(PropagationKey::TransactionContext, "trx")
            .with_local(PropagationKey::RemoteAddress, "127.0.0.1:1");

        let seen = dispatcher
            .post(
                &caller,
                "/orders",
                "{\"id\":1}".to_string(),
                vec![],
                Some("application/json".to_string()),
                "record",
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(seen.handler, "processPost");
        assert_eq!(seen.path, "/orders");
        assert_eq!(seen.message.as_deref(), Some("{\"id\":1}"));
        assert_eq!(seen.media_type.as_deref(), Some("application/json"));
        assert_eq!(
            seen.keys,
            vec![
                PropagationKey::TransactionContext,
                PropagationKey::MainStrand,
                PropagationKey::RemoteAddress
            ]
        );
        assert!(seen.main_strand);
    }

    #[tokio::test]
    async fn test_head_takes_path_and_headers_only() {
        let dispatcher = dispatcher();
        let seen = dispatcher
            .head_resource(
                &CallerContext::new(),
                &ResourcePath::new(["status"]),
                vec![("x".into(), "1".into())],
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen.handler, "head");
        assert_eq!(seen.path, "/status");
        assert!(seen.keys.is_empty());
    }

    #[tokio::test]
    async fn test_domain_error_passes_through() {
        let dispatcher = dispatcher();
        let result = dispatcher
            .get(&CallerContext::new(), "/missing/thing", vec![], "json")
            .await
            .unwrap();
        assert_eq!(result, Err(DomainError("404 Not Found".into())));
    }

    #[tokio::test]
    async fn test_mechanism_failure_is_wrapped() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .delete(&CallerContext::new(), "/orders/1", String::new(), vec![], None, "json")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "client method invocation failed: boom");
        assert_eq!(err.verb(), Verb::Delete);
        assert!(matches!(err.failure(), ClientFailure::Other(_)));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_wrapped() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .patch(&CallerContext::new(), "/orders/1", String::new(), vec![], None, "json")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "client method invocation failed: boom");
        assert!(matches!(err.failure(), ClientFailure::Panicked(_)));
    }

    #[tokio::test]
    async fn test_missing_handler_is_wrapped() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .put(&CallerContext::new(), "/orders/1", String::new(), vec![], None, "json")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "client method invocation failed: no such method 'processPut'"
        );

        let err = dispatcher
            .options(&CallerContext::new(), "/", vec![], "json")
            .await
            .unwrap_err();
        assert!(matches!(err.failure(), ClientFailure::MethodNotFound(Verb::Options)));
    }

    #[tokio::test]
    async fn test_detector_rule_is_applied() {
        let client = Arc::new(RecordingClient::default());
        let dispatcher = Dispatcher::with_detector(
            client.clone(),
            MainStrandDetector::new(MainStrandRule::CurrentTask, "onMessage"),
        );

        let on_parent = CallerContext::new().with_parent_function("onMessage");
        let on_self = CallerContext::new().with_name("onMessage");

        let a = dispatcher.get(&on_parent, "/a", vec![], "json").await.unwrap().unwrap();
        let b = dispatcher.get(&on_self, "/b", vec![], "json").await.unwrap().unwrap();

        assert!(!a.main_strand);
        assert!(b.main_strand);
        assert_eq!(client.calls.lock().unwrap().len(), 2);
    }

    /// Counts the counters registered while it is the local recorder.
    #[derive(Default)]
    struct CountingRecorder {
        counters: std::sync::atomic::AtomicUsize,
    }

    impl ::metrics::Recorder for CountingRecorder {
        fn describe_counter(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_gauge(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_histogram(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}

        fn register_counter(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Counter {
            self.counters.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            ::metrics::Counter::noop()
        }

        fn register_gauge(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Gauge {
            ::metrics::Gauge::noop()
        }

        fn register_histogram(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Histogram {
            ::metrics::Histogram::noop()
        }
    }

    fn counted_get(dispatcher: &Dispatcher<RecordingClient>) -> usize {
        let recorder = CountingRecorder::default();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        ::metrics::with_local_recorder(&recorder, || {
            runtime
                .block_on(dispatcher.get(&CallerContext::new(), "/m", vec![], "json"))
                .unwrap()
                .unwrap();
        });
        recorder.counters.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[test]
    fn test_metrics_follow_switch() {
        let enabled = dispatcher();
        assert!(enabled.metrics_enabled());
        assert_eq!(counted_get(&enabled), 1);

        let disabled = dispatcher().with_metrics(false);
        assert!(!disabled.metrics_enabled());
        assert_eq!(counted_get(&disabled), 0);
    }
}
