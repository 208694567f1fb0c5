//! # Parley Core
//!
//! Predicate-dispatch request router for conversational skills.
//!
//! This layer provides:
//! - Ordered request handlers selected by first-match predicates
//! - Ordered exception handlers that turn handler errors into responses
//! - Request and response interceptors wrapping every dispatch cycle
//! - A per-cycle [`Context`] with attributes and shared service handles
//!
//! The core is generic over the request and response types; platform
//! adapters supply both and implement [`Request`] for their request model.

pub mod builder;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod interceptor;
pub mod predicate;
pub mod registry;
pub mod request;

pub use builder::DispatcherBuilder;
pub use context::{Context, ServiceArc};
pub use dispatcher::Dispatcher;
pub use error::{
    BoxError, DispatchError, DispatchResult, HandlerError, HandlerResult, InterceptorError,
};
pub use handler::{ExceptionHandler, RequestHandler};
pub use interceptor::{InterceptorPolicy, RequestInterceptor, ResponseInterceptor};
pub use predicate::Predicate;
pub use registry::HandlerRegistry;
pub use request::Request;
