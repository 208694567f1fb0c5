//! Startup-time construction of a [`Dispatcher`].
//!
//! All registration happens on a [`DispatcherBuilder`]. Calling
//! [`build`](DispatcherBuilder::build) consumes the builder and yields an
//! immutable dispatcher; the dispatcher has no registration API, so the
//! handler and interceptor sequences cannot change once serving starts.
//!
//! ```rust,ignore
//! let mut builder = DispatcherBuilder::new();
//! builder
//!     .add_request_handler(launch_handler())
//!     .add_request_handler(fallback_handler()) // catch-all goes last
//!     .add_exception_handler(catch_all_errors())
//!     .add_request_interceptor(log_request())
//!     .add_response_interceptor(log_response());
//! let dispatcher = builder.build();
//! ```

use std::any::TypeId;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::ServiceMap;
use crate::dispatcher::{Dispatcher, DispatcherInner};
use crate::handler::{ExceptionHandler, RequestHandler};
use crate::interceptor::{InterceptorPolicy, RequestInterceptor, ResponseInterceptor};
use crate::registry::HandlerRegistry;
use crate::request::Request;

/// Collects handlers, interceptors and services before serving starts.
pub struct DispatcherBuilder<R, Resp> {
    registry: HandlerRegistry<R, Resp>,
    request_interceptors: Vec<RequestInterceptor<R>>,
    response_interceptors: Vec<ResponseInterceptor<R, Resp>>,
    services: ServiceMap,
    policy: InterceptorPolicy,
}

impl<R: Request, Resp> Default for DispatcherBuilder<R, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Request, Resp> DispatcherBuilder<R, Resp> {
    /// Creates an empty builder with the default interceptor policy.
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            services: ServiceMap::new(),
            policy: InterceptorPolicy::default(),
        }
    }

    /// Appends a request handler. Earlier handlers take priority.
    pub fn add_request_handler(&mut self, handler: RequestHandler<R, Resp>) -> &mut Self {
        self.registry.register(handler);
        self
    }

    /// Appends an exception handler. Earlier handlers take priority.
    pub fn add_exception_handler(&mut self, handler: ExceptionHandler<R, Resp>) -> &mut Self {
        self.registry.register_exception(handler);
        self
    }

    /// Appends a hook run before handler selection.
    pub fn add_request_interceptor(&mut self, interceptor: RequestInterceptor<R>) -> &mut Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Appends a hook run after a response has been produced.
    pub fn add_response_interceptor(
        &mut self,
        interceptor: ResponseInterceptor<R, Resp>,
    ) -> &mut Self {
        self.response_interceptors.push(interceptor);
        self
    }

    /// Registers a service handle that actions can look up through
    /// [`Context::get_service`](crate::Context::get_service).
    ///
    /// `T` may be a trait object, e.g. `builder.service::<dyn Client>(client)`.
    /// Registering the same type twice replaces the earlier handle.
    pub fn service<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.insert(TypeId::of::<T>(), Arc::new(service));
        self
    }

    /// Sets how interceptor failures are treated.
    pub fn interceptor_policy(&mut self, policy: InterceptorPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Seals the configuration into an immutable [`Dispatcher`].
    pub fn build(self) -> Dispatcher<R, Resp> {
        if let Some(index) = self.registry.shadowing_catch_all() {
            let handler = &self.registry.request_handlers()[index];
            warn!(
                handler = handler.name(),
                position = index,
                "Catch-all request handler is not registered last; later handlers are unreachable"
            );
        }

        debug!(
            request_handlers = self.registry.request_handlers().len(),
            exception_handlers = self.registry.exception_handlers().len(),
            request_interceptors = self.request_interceptors.len(),
            response_interceptors = self.response_interceptors.len(),
            services = self.services.len(),
            policy = %self.policy,
            "Dispatcher sealed"
        );

        Dispatcher::from_inner(DispatcherInner {
            registry: self.registry,
            request_interceptors: self.request_interceptors,
            response_interceptors: self.response_interceptors,
            services: Arc::new(self.services),
            policy: self.policy,
        })
    }
}
