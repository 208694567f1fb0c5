//! Request and exception handlers.
//!
//! A handler is a plain data pair: an optional predicate deciding whether the
//! handler applies, and an action producing the response. There is no handler
//! class hierarchy; a handler is built from two closures.
//!
//! ```rust,ignore
//! use parley_core::{Predicate, RequestHandler};
//!
//! let launch = RequestHandler::new("launch", |ctx| Ok(greet(ctx)))
//!     .rule(Predicate::kind_is("LaunchRequest"));
//!
//! // No check means match all: a catch-all that must be registered last.
//! let fallback = RequestHandler::new("fallback", |_| Ok(fallback_response()));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{HandlerError, HandlerResult};
use crate::predicate::Predicate;
use crate::request::Request;

/// A type-erased request action.
pub type ActionFn<R, Resp> = Arc<dyn Fn(&Context<R>) -> HandlerResult<Resp> + Send + Sync>;

/// A type-erased exception predicate.
pub type ExceptionCheckFn<R> = Arc<dyn Fn(&Context<R>, &HandlerError) -> bool + Send + Sync>;

/// A type-erased exception action.
pub type ExceptionActionFn<R, Resp> =
    Arc<dyn Fn(&Context<R>, &HandlerError) -> HandlerResult<Resp> + Send + Sync>;

// ============================================================================
// RequestHandler
// ============================================================================

/// A (predicate, action) pair for requests.
pub struct RequestHandler<R, Resp> {
    name: String,
    check: Option<Predicate<R>>,
    action: ActionFn<R, Resp>,
}

impl<R, Resp> Clone for RequestHandler<R, Resp> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            check: self.check.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<R: Request, Resp> RequestHandler<R, Resp> {
    /// Creates a handler with the given action.
    ///
    /// Without a check the handler matches every request.
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Context<R>) -> HandlerResult<Resp> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: None,
            action: Arc::new(action),
        }
    }

    /// Sets the predicate from a closure.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(&Context<R>) -> bool + Send + Sync + 'static,
    {
        self.rule(Predicate::new(f))
    }

    /// Sets the predicate from a composed [`Predicate`].
    pub fn rule(mut self, predicate: Predicate<R>) -> Self {
        self.check = Some(predicate);
        self
    }

    /// Returns the handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this handler has no predicate.
    pub fn is_catch_all(&self) -> bool {
        self.check.is_none()
    }

    /// Evaluates the predicate.
    pub fn can_handle(&self, ctx: &Context<R>) -> bool {
        match &self.check {
            Some(p) => p.test(ctx),
            None => true,
        }
    }

    /// Runs the action.
    pub fn handle(&self, ctx: &Context<R>) -> HandlerResult<Resp> {
        (self.action)(ctx)
    }
}

impl<R, Resp> fmt::Debug for RequestHandler<R, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler")
            .field("name", &self.name)
            .field("catch_all", &self.check.is_none())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ExceptionHandler
// ============================================================================

/// A (predicate, action) pair for handler errors.
pub struct ExceptionHandler<R, Resp> {
    name: String,
    check: Option<ExceptionCheckFn<R>>,
    action: ExceptionActionFn<R, Resp>,
}

impl<R, Resp> Clone for ExceptionHandler<R, Resp> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            check: self.check.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<R: Request, Resp> ExceptionHandler<R, Resp> {
    /// Creates an exception handler with the given action.
    ///
    /// Without a check the handler accepts every error.
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Context<R>, &HandlerError) -> HandlerResult<Resp> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: None,
            action: Arc::new(action),
        }
    }

    /// Sets the predicate.
    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<R>, &HandlerError) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(f));
        self
    }

    /// Returns the handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the predicate.
    pub fn can_handle(&self, ctx: &Context<R>, error: &HandlerError) -> bool {
        match &self.check {
            Some(f) => f(ctx, error),
            None => true,
        }
    }

    /// Runs the action.
    pub fn handle(&self, ctx: &Context<R>, error: &HandlerError) -> HandlerResult<Resp> {
        (self.action)(ctx, error)
    }
}

impl<R, Resp> fmt::Debug for ExceptionHandler<R, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionHandler")
            .field("name", &self.name)
            .field("catch_all", &self.check.is_none())
            .finish_non_exhaustive()
    }
}
