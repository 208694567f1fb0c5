//! Request dispatcher for the Parley router.
//!
//! The [`Dispatcher`] runs one synchronous cycle per request:
//!
//! 1. A fresh [`Context`] is built around the request
//! 2. Request interceptors run in registration order
//! 3. Request handlers are scanned in registration order and the first
//!    matching one is selected; none matching is fatal
//! 4. The selected action runs
//! 5. If the action fails, exception handlers are scanned in registration
//!    order and the first matching one produces the response; none matching,
//!    or a failing exception action, is fatal
//! 6. Response interceptors run in registration order
//!
//! Exactly one action (request or exception) runs per cycle, and response
//! interceptors only run once a response exists.
//!
//! # Thread Safety
//!
//! `Dispatcher` is `Send + Sync` and cheap to clone. Concurrent cycles share
//! nothing mutable: each one owns its context, and the handler sequences are
//! frozen when the [`DispatcherBuilder`] is built.

use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures::future::{Ready, ready};
use tower::Service;
use tracing::{Level, debug, error, span, warn};

use crate::builder::DispatcherBuilder;
use crate::context::{Context, ServiceMap};
use crate::error::{DispatchError, DispatchResult, HandlerError, InterceptorError};
use crate::interceptor::{InterceptorPolicy, RequestInterceptor, ResponseInterceptor};
use crate::registry::HandlerRegistry;
use crate::request::Request;

pub(crate) struct DispatcherInner<R, Resp> {
    pub(crate) registry: HandlerRegistry<R, Resp>,
    pub(crate) request_interceptors: Vec<RequestInterceptor<R>>,
    pub(crate) response_interceptors: Vec<ResponseInterceptor<R, Resp>>,
    pub(crate) services: Arc<ServiceMap>,
    pub(crate) policy: InterceptorPolicy,
}

/// The sealed, immutable request router.
pub struct Dispatcher<R, Resp> {
    inner: Arc<DispatcherInner<R, Resp>>,
}

impl<R, Resp> Clone for Dispatcher<R, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Request, Resp> Dispatcher<R, Resp> {
    /// Starts configuring a new dispatcher.
    pub fn builder() -> DispatcherBuilder<R, Resp> {
        DispatcherBuilder::new()
    }

    pub(crate) fn from_inner(inner: DispatcherInner<R, Resp>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the registered handlers.
    pub fn registry(&self) -> &HandlerRegistry<R, Resp> {
        &self.inner.registry
    }

    /// Returns the interceptor failure policy.
    pub fn interceptor_policy(&self) -> InterceptorPolicy {
        self.inner.policy
    }

    /// Routes one request to exactly one action and returns its response.
    pub fn dispatch(&self, request: R) -> DispatchResult<Resp> {
        let ctx = Context::new(request, Arc::clone(&self.inner.services));
        let span = span!(Level::DEBUG, "dispatch", cycle_id = %ctx.id(), kind = %ctx.kind());
        let _enter = span.enter();

        let result = self.run_cycle(&ctx);
        if let Err(e) = &result {
            error!(error = %e, "Dispatch failed");
        }
        result
    }

    fn run_cycle(&self, ctx: &Context<R>) -> DispatchResult<Resp> {
        for interceptor in &self.inner.request_interceptors {
            if let Err(e) = interceptor.process(ctx) {
                self.interceptor_failed(interceptor.name(), e)?;
            }
        }

        let handler = self.inner.registry.find_request_handler(ctx)?.ok_or_else(|| {
            DispatchError::NoHandlerFound {
                kind: ctx.kind().to_string(),
            }
        })?;
        debug!(handler = handler.name(), "Request handler selected");

        let response = match handler.handle(ctx) {
            Ok(response) => response,
            Err(e) => self.recover(ctx, handler.name(), e)?,
        };

        for interceptor in &self.inner.response_interceptors {
            if let Err(e) = interceptor.process(ctx, &response) {
                self.interceptor_failed(interceptor.name(), e)?;
            }
        }

        Ok(response)
    }

    fn recover(
        &self,
        ctx: &Context<R>,
        handler: &str,
        error: HandlerError,
    ) -> DispatchResult<Resp> {
        debug!(handler, error = %error, "Request handler failed, scanning exception handlers");

        let Some(exception_handler) = self.inner.registry.find_exception_handler(ctx, &error)?
        else {
            return Err(DispatchError::UnhandledHandlerError {
                handler: handler.to_string(),
                exception_handler: None,
                source: error,
            });
        };
        debug!(
            exception_handler = exception_handler.name(),
            "Exception handler selected"
        );

        exception_handler
            .handle(ctx, &error)
            .map_err(|source| DispatchError::UnhandledHandlerError {
                handler: handler.to_string(),
                exception_handler: Some(exception_handler.name().to_string()),
                source,
            })
    }

    fn interceptor_failed(
        &self,
        interceptor: &str,
        source: InterceptorError,
    ) -> DispatchResult<()> {
        match self.inner.policy {
            InterceptorPolicy::Swallow => {
                warn!(interceptor, error = %source, "Interceptor failed, continuing");
                Ok(())
            }
            InterceptorPolicy::Propagate => Err(DispatchError::InterceptorFailed {
                interceptor: interceptor.to_string(),
                source,
            }),
        }
    }
}

impl<R, Resp> std::fmt::Debug for Dispatcher<R, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "request_handlers",
                &self.inner.registry.request_handlers().len(),
            )
            .field(
                "exception_handlers",
                &self.inner.registry.exception_handlers().len(),
            )
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tower Service Implementation for Dispatcher
// ============================================================================

/// Tower Service implementation for Dispatcher.
///
/// The dispatcher is always ready and completes synchronously, so it can be
/// wrapped in tower middleware like any other service.
impl<R: Request, Resp> Service<R> for Dispatcher<R, Resp> {
    type Response = Resp;
    type Error = DispatchError;
    type Future = Ready<DispatchResult<Resp>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: R) -> Self::Future {
        ready(self.dispatch(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ExceptionHandler, RequestHandler};
    use crate::predicate::Predicate;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Debug, Clone, PartialEq)]
    struct TestRequest {
        kind: &'static str,
        payload: u32,
    }

    impl Request for TestRequest {
        fn kind(&self) -> &str {
            self.kind
        }
    }

    fn request(kind: &'static str) -> TestRequest {
        TestRequest { kind, payload: 1 }
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn new_builder() -> DispatcherBuilder<TestRequest, String> {
        DispatcherBuilder::new()
    }

    fn recording(
        log: &Log,
        name: &'static str,
        kind: &'static str,
    ) -> RequestHandler<TestRequest, String> {
        let log = Arc::clone(log);
        RequestHandler::new(name, move |_| {
            log.lock().push(name.to_string());
            Ok(name.to_string())
        })
        .rule(Predicate::kind_is(kind))
    }

    fn failing(name: &'static str, kind: &'static str) -> RequestHandler<TestRequest, String> {
        RequestHandler::new(name, |_| Err(HandlerError::new("x"))).rule(Predicate::kind_is(kind))
    }

    fn catch_all_errors() -> ExceptionHandler<TestRequest, String> {
        ExceptionHandler::new("catch-all", |_, e| Ok(format!("recovered from {e}")))
    }

    #[test]
    fn test_dispatch_no_handlers() {
        let dispatcher = new_builder().build();
        let err = dispatcher.dispatch(request("launch")).unwrap_err();
        assert!(err.is_no_handler());
        assert_eq!(
            err.to_string(),
            "no request handler can handle request of kind 'launch'"
        );
    }

    #[test]
    fn test_only_matching_handler_runs() {
        let log = Log::default();
        let mut builder = new_builder();
        builder
            .add_request_handler(recording(&log, "launch", "launch"))
            .add_request_handler(recording(&log, "help", "help"))
            .add_request_handler(recording(&log, "stop", "stop"));
        let dispatcher = builder.build();

        let response = dispatcher.dispatch(request("help")).unwrap();

        assert_eq!(response, "help");
        assert_eq!(*log.lock(), vec!["help".to_string()]);
    }

    #[test]
    fn test_first_match_wins() {
        let log = Log::default();
        let mut builder = new_builder();
        builder
            .add_request_handler(recording(&log, "h1", "launch"))
            .add_request_handler(recording(&log, "h2", "launch"));
        let dispatcher = builder.build();

        assert_eq!(dispatcher.dispatch(request("launch")).unwrap(), "h1");
        assert_eq!(*log.lock(), vec!["h1".to_string()]);
    }

    #[test]
    fn test_early_catch_all_shadows_specific_handler() {
        let log = Log::default();
        let fallback: RequestHandler<TestRequest, String> = {
            let log = Arc::clone(&log);
            RequestHandler::new("fallback", move |_| {
                log.lock().push("fallback".into());
                Ok("fallback".to_string())
            })
        };

        let mut shadowed = new_builder();
        shadowed
            .add_request_handler(fallback.clone())
            .add_request_handler(recording(&log, "launch", "launch"));
        let shadowed = shadowed.build();
        assert_eq!(shadowed.dispatch(request("launch")).unwrap(), "fallback");

        let mut ordered = new_builder();
        ordered
            .add_request_handler(recording(&log, "launch", "launch"))
            .add_request_handler(fallback);
        let ordered = ordered.build();
        assert_eq!(ordered.dispatch(request("launch")).unwrap(), "launch");
        assert_eq!(ordered.dispatch(request("other")).unwrap(), "fallback");

        assert_eq!(*log.lock(), vec!["fallback", "launch", "fallback"]);
    }

    #[test]
    fn test_interceptor_ordering() {
        let log = Log::default();
        let mut builder = new_builder();

        for name in ["pre1", "pre2"] {
            let log = Arc::clone(&log);
            builder.add_request_interceptor(RequestInterceptor::infallible(
                name,
                move |ctx: &Context<TestRequest>| {
                    assert!(!ctx.has_attribute::<String>(), "pre-hook saw response state");
                    log.lock().push(name.to_string());
                },
            ));
        }
        for name in ["post1", "post2"] {
            let log = Arc::clone(&log);
            builder.add_response_interceptor(ResponseInterceptor::infallible(
                name,
                move |ctx: &Context<TestRequest>, response: &String| {
                    assert_eq!(ctx.get_attribute::<String>().as_deref(), Some("action"));
                    log.lock().push(format!("{name}:{response}"));
                },
            ));
        }

        let action_log = Arc::clone(&log);
        builder.add_request_handler(RequestHandler::new(
            "action",
            move |ctx: &Context<TestRequest>| {
                ctx.set_attribute("action".to_string());
                action_log.lock().push("action".into());
                Ok("done".to_string())
            },
        ));

        builder.build().dispatch(request("launch")).unwrap();

        assert_eq!(
            *log.lock(),
            vec!["pre1", "pre2", "action", "post1:done", "post2:done"]
        );
    }

    #[test]
    fn test_exception_recovery() {
        let mut builder = new_builder();
        builder
            .add_request_handler(failing("reminder", "launch"))
            .add_exception_handler(catch_all_errors());
        let dispatcher = builder.build();

        assert_eq!(dispatcher.dispatch(request("launch")).unwrap(), "recovered from x");
    }

    #[test]
    fn test_first_matching_exception_handler_runs() {
        let ran = Log::default();
        let recover = |name: &'static str| {
            let ran = Arc::clone(&ran);
            ExceptionHandler::new(name, move |_: &Context<TestRequest>, _: &HandlerError| {
                ran.lock().push(name.to_string());
                Ok(name.to_string())
            })
        };

        let mut builder = new_builder();
        builder
            .add_request_handler(failing("reminder", "launch"))
            .add_exception_handler(
                recover("timeouts").check(|_, e: &HandlerError| e.message() == "timeout"),
            )
            .add_exception_handler(recover("first"))
            .add_exception_handler(recover("second"));

        assert_eq!(builder.build().dispatch(request("launch")).unwrap(), "first");
        assert_eq!(*ran.lock(), vec!["first".to_string()]);
    }

    #[test]
    fn test_panicking_exception_predicate_aborts_cycle() {
        let mut builder = new_builder();
        builder
            .add_request_handler(failing("reminder", "launch"))
            .add_exception_handler(
                ExceptionHandler::new("broken", |_, _| Ok("never".to_string()))
                    .check(|_: &Context<TestRequest>, _: &HandlerError| panic!("matcher bug")),
            )
            .add_exception_handler(catch_all_errors());

        let err = builder.build().dispatch(request("launch")).unwrap_err();
        match err {
            DispatchError::PredicateFailed { handler, message } => {
                assert_eq!(handler, "broken");
                assert_eq!(message, "matcher bug");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unmatched_error_propagates_and_skips_post_hooks() {
        let posts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&posts);

        let mut builder = new_builder();
        builder
            .add_request_handler(failing("reminder", "launch"))
            .add_response_interceptor(ResponseInterceptor::infallible("count", move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        let err = builder.build().dispatch(request("launch")).unwrap_err();
        match err {
            DispatchError::UnhandledHandlerError {
                handler,
                exception_handler,
                source,
            } => {
                assert_eq!(handler, "reminder");
                assert!(exception_handler.is_none());
                assert_eq!(source.message(), "x");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(posts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failing_exception_handler_is_fatal() {
        let mut builder = new_builder();
        builder
            .add_request_handler(failing("reminder", "launch"))
            .add_exception_handler(ExceptionHandler::new("broken", |_, _| {
                Err(HandlerError::new("still broken"))
            }))
            .add_exception_handler(catch_all_errors());

        let err = builder.build().dispatch(request("launch")).unwrap_err();
        match err {
            DispatchError::UnhandledHandlerError {
                exception_handler,
                source,
                ..
            } => {
                assert_eq!(exception_handler.as_deref(), Some("broken"));
                assert_eq!(source.message(), "still broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_handler_found_skips_exception_chain() {
        let mut builder = new_builder();
        builder
            .add_request_handler(failing("reminder", "launch"))
            .add_exception_handler(catch_all_errors());

        let err = builder.build().dispatch(request("help")).unwrap_err();
        assert!(err.is_no_handler());
    }

    #[test]
    fn test_swallowed_interceptor_failures() {
        let mut builder = new_builder();
        builder
            .add_request_handler(recording(&Log::default(), "launch", "launch"))
            .add_request_interceptor(RequestInterceptor::new("pre", |_| {
                Err(InterceptorError::new("log sink down"))
            }))
            .add_response_interceptor(ResponseInterceptor::new("post", |_, _| {
                Err(InterceptorError::new("metrics down"))
            }));
        let dispatcher = builder.build();

        assert_eq!(dispatcher.interceptor_policy(), InterceptorPolicy::Swallow);
        assert_eq!(dispatcher.dispatch(request("launch")).unwrap(), "launch");
    }

    #[test]
    fn test_propagated_pre_interceptor_failure_skips_handler() {
        let log = Log::default();
        let mut builder = new_builder();
        builder
            .interceptor_policy(InterceptorPolicy::Propagate)
            .add_request_handler(recording(&log, "launch", "launch"))
            .add_request_interceptor(RequestInterceptor::new("pre", |_| {
                Err(InterceptorError::new("log sink down"))
            }));

        let err = builder.build().dispatch(request("launch")).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InterceptorFailed { ref interceptor, .. } if interceptor == "pre"
        ));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_propagated_post_interceptor_failure() {
        let mut builder = new_builder();
        builder
            .interceptor_policy(InterceptorPolicy::Propagate)
            .add_request_handler(recording(&Log::default(), "launch", "launch"))
            .add_response_interceptor(ResponseInterceptor::new("post", |_, _| {
                Err(InterceptorError::new("metrics down"))
            }));

        let err = builder.build().dispatch(request("launch")).unwrap_err();
        assert_eq!(err.to_string(), "interceptor 'post' failed: metrics down");
    }

    #[test]
    fn test_panicking_predicate_aborts_cycle() {
        let mut builder = new_builder();
        builder
            .add_request_handler(
                RequestHandler::new("broken", |_| Ok("never".to_string()))
                    .check(|_: &Context<TestRequest>| panic!("predicate bug")),
            )
            .add_request_handler(RequestHandler::new("fallback", |_| {
                Ok("fallback".to_string())
            }));

        let err = builder.build().dispatch(request("launch")).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::PredicateFailed { ref handler, .. } if handler == "broken"
        ));
    }

    #[test]
    fn test_services_reach_actions() {
        let mut builder = new_builder();
        builder
            .service(Arc::new("en-US".to_string()))
            .add_request_handler(RequestHandler::new("locale", |ctx: &Context<TestRequest>| {
                let locale = ctx.require_service::<String>()?;
                Ok(format!("{}:{}", ctx.kind(), locale))
            }));

        assert_eq!(
            builder.build().dispatch(request("launch")).unwrap(),
            "launch:en-US"
        );
    }

    #[test]
    fn test_missing_service_goes_through_exception_chain() {
        let mut builder = new_builder();
        builder
            .add_request_handler(RequestHandler::new("locale", |ctx: &Context<TestRequest>| {
                ctx.require_service::<u64>().map(|v| v.to_string())
            }))
            .add_exception_handler(catch_all_errors());

        let response = builder.build().dispatch(request("launch")).unwrap();
        assert!(response.starts_with("recovered from service not registered"));
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let mut builder = new_builder();
        builder.add_request_handler(RequestHandler::new("echo", |ctx: &Context<TestRequest>| {
            Ok(format!("{}#{}", ctx.kind(), ctx.request().payload))
        }));
        let dispatcher = builder.build();

        let req = TestRequest {
            kind: "launch",
            payload: 42,
        };
        let first = dispatcher.dispatch(req.clone()).unwrap();
        let second = dispatcher.dispatch(req).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_cycles_are_independent() {
        let mut builder = DispatcherBuilder::<TestRequest, u32>::new();
        builder.add_request_handler(RequestHandler::new("echo", |ctx: &Context<TestRequest>| {
            ctx.set_attribute(ctx.request().payload);
            Ok(ctx.get_attribute::<u32>().unwrap_or_default())
        }));
        let dispatcher = builder.build();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u32)
                .map(|payload| {
                    let dispatcher = dispatcher.clone();
                    scope.spawn(move || {
                        dispatcher
                            .dispatch(TestRequest {
                                kind: "launch",
                                payload,
                            })
                            .unwrap()
                    })
                })
                .collect();

            for (payload, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.join().unwrap(), payload as u32);
            }
        });
    }

    #[test]
    fn test_dispatcher_as_tower_service() {
        let mut builder = new_builder();
        builder.add_request_handler(recording(&Log::default(), "launch", "launch"));
        let dispatcher = builder.build();

        let response = tokio_test::block_on(dispatcher.oneshot(request("launch"))).unwrap();
        assert_eq!(response, "launch");
    }

    #[test]
    fn test_debug_reports_handler_counts() {
        let mut builder = new_builder();
        builder
            .add_request_handler(recording(&Log::default(), "launch", "launch"))
            .add_exception_handler(catch_all_errors());
        let debug = format!("{:?}", builder.build());

        assert!(debug.contains("request_handlers: 1"));
        assert!(debug.contains("exception_handlers: 1"));
        assert!(debug.contains("policy: Swallow"));
    }
}
