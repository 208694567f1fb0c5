//! Ordered handler registry.
//!
//! The registry keeps two independent, ordered sequences: request handlers and
//! exception handlers. Insertion order is dispatch priority (first registered
//! wins) and is preserved exactly; there is no de-duplication and no
//! re-ordering. Lookup is a linear scan because predicates may overlap, so
//! order carries meaning that a lookup table would lose.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::trace;

use crate::context::Context;
use crate::error::{DispatchError, HandlerError};
use crate::handler::{ExceptionHandler, RequestHandler};
use crate::request::Request;

/// Ordered request and exception handler sequences.
pub struct HandlerRegistry<R, Resp> {
    request_handlers: Vec<RequestHandler<R, Resp>>,
    exception_handlers: Vec<ExceptionHandler<R, Resp>>,
}

impl<R, Resp> Default for HandlerRegistry<R, Resp> {
    fn default() -> Self {
        Self {
            request_handlers: Vec::new(),
            exception_handlers: Vec::new(),
        }
    }
}

impl<R, Resp> Clone for HandlerRegistry<R, Resp> {
    fn clone(&self) -> Self {
        Self {
            request_handlers: self.request_handlers.clone(),
            exception_handlers: self.exception_handlers.clone(),
        }
    }
}

impl<R, Resp> HandlerRegistry<R, Resp> {
    /// Returns the request handlers in priority order.
    pub fn request_handlers(&self) -> &[RequestHandler<R, Resp>] {
        &self.request_handlers
    }

    /// Returns the exception handlers in priority order.
    pub fn exception_handlers(&self) -> &[ExceptionHandler<R, Resp>] {
        &self.exception_handlers
    }
}

impl<R: Request, Resp> HandlerRegistry<R, Resp> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request handler at the lowest priority.
    pub fn register(&mut self, handler: RequestHandler<R, Resp>) {
        self.request_handlers.push(handler);
    }

    /// Appends an exception handler at the lowest priority.
    pub fn register_exception(&mut self, handler: ExceptionHandler<R, Resp>) {
        self.exception_handlers.push(handler);
    }

    /// Returns the index of the first catch-all request handler that is
    /// followed by other handlers, if any.
    ///
    /// Such a handler shadows every handler registered after it.
    pub fn shadowing_catch_all(&self) -> Option<usize> {
        let last = self.request_handlers.len().checked_sub(1)?;
        self.request_handlers
            .iter()
            .position(RequestHandler::is_catch_all)
            .filter(|&i| i < last)
    }

    /// Selects the first request handler whose predicate matches.
    pub fn find_request_handler(
        &self,
        ctx: &Context<R>,
    ) -> Result<Option<&RequestHandler<R, Resp>>, DispatchError> {
        for handler in &self.request_handlers {
            let matched = catch_unwind(AssertUnwindSafe(|| handler.can_handle(ctx))).map_err(
                |payload| DispatchError::PredicateFailed {
                    handler: handler.name().to_string(),
                    message: panic_message(payload.as_ref()),
                },
            )?;

            if matched {
                return Ok(Some(handler));
            }
            trace!(handler = handler.name(), "Request handler check failed, skipping");
        }
        Ok(None)
    }

    /// Selects the first exception handler whose predicate matches `error`.
    pub fn find_exception_handler(
        &self,
        ctx: &Context<R>,
        error: &HandlerError,
    ) -> Result<Option<&ExceptionHandler<R, Resp>>, DispatchError> {
        for handler in &self.exception_handlers {
            let matched = catch_unwind(AssertUnwindSafe(|| handler.can_handle(ctx, error)))
                .map_err(|payload| DispatchError::PredicateFailed {
                    handler: handler.name().to_string(),
                    message: panic_message(payload.as_ref()),
                })?;

            if matched {
                return Ok(Some(handler));
            }
            trace!(handler = handler.name(), "Exception handler check failed, skipping");
        }
        Ok(None)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "predicate panicked".to_string()
    }
}
