//! Composable request predicates.
//!
//! A [`Predicate`] decides whether a handler applies to a context. Predicates
//! must be pure and total: they may read the context but must not mutate it,
//! and they must always return. A panicking predicate is treated as a
//! programming defect and turns the whole dispatch cycle into
//! [`DispatchError::PredicateFailed`](crate::DispatchError::PredicateFailed).

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;

type PredicateFn<R> = dyn Fn(&Context<R>) -> bool + Send + Sync;

/// A type-erased, cheaply clonable predicate over a [`Context`].
pub struct Predicate<R>(Arc<PredicateFn<R>>);

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R: Request> Predicate<R> {
    /// Creates a predicate from a synchronous closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context<R>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A predicate that matches every request.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Matches requests whose [`kind`](Request::kind) equals `kind`.
    pub fn kind_is(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self::new(move |ctx| ctx.kind() == kind)
    }

    /// Matches when both predicates match. `other` is not evaluated if `self`
    /// does not match.
    pub fn and(self, other: Self) -> Self {
        Self::new(move |ctx| self.test(ctx) && other.test(ctx))
    }

    /// Matches when either predicate matches. `other` is not evaluated if
    /// `self` matches.
    pub fn or(self, other: Self) -> Self {
        Self::new(move |ctx| self.test(ctx) || other.test(ctx))
    }

    /// Inverts this predicate.
    pub fn not(self) -> Self {
        Self::new(move |ctx| !self.test(ctx))
    }

    /// Evaluates the predicate against a context.
    pub fn test(&self, ctx: &Context<R>) -> bool {
        (self.0)(ctx)
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
