//! Request and response interceptors.
//!
//! Interceptors are side-effect-only hooks (logging, metrics) that wrap every
//! dispatch cycle. Request interceptors run before handler selection, response
//! interceptors run once a response exists. Neither kind can change which
//! handler is chosen or alter the response, and neither can short-circuit
//! dispatch.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::InterceptorError;
use crate::request::Request;

type RequestHookFn<R> = dyn Fn(&Context<R>) -> Result<(), InterceptorError> + Send + Sync;
type ResponseHookFn<R, Resp> =
    dyn Fn(&Context<R>, &Resp) -> Result<(), InterceptorError> + Send + Sync;

/// What the dispatcher does when an interceptor fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterceptorPolicy {
    /// Log the failure at WARN and carry on with the cycle.
    #[default]
    Swallow,
    /// Abort the cycle with
    /// [`DispatchError::InterceptorFailed`](crate::DispatchError::InterceptorFailed).
    Propagate,
}

impl InterceptorPolicy {
    /// Returns the policy name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swallow => "swallow",
            Self::Propagate => "propagate",
        }
    }
}

impl fmt::Display for InterceptorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hook run before handler selection.
pub struct RequestInterceptor<R> {
    name: String,
    hook: Arc<RequestHookFn<R>>,
}

impl<R> Clone for RequestInterceptor<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<R: Request> RequestInterceptor<R> {
    /// Creates an interceptor from a fallible hook.
    pub fn new<F>(name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Context<R>) -> Result<(), InterceptorError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            hook: Arc::new(hook),
        }
    }

    /// Creates an interceptor from a hook that cannot fail.
    pub fn infallible<F>(name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Context<R>) + Send + Sync + 'static,
    {
        Self::new(name, move |ctx| {
            hook(ctx);
            Ok(())
        })
    }

    /// Returns the interceptor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the hook.
    pub fn process(&self, ctx: &Context<R>) -> Result<(), InterceptorError> {
        (self.hook)(ctx)
    }
}

impl<R> fmt::Debug for RequestInterceptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestInterceptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A hook run after a response has been produced.
pub struct ResponseInterceptor<R, Resp> {
    name: String,
    hook: Arc<ResponseHookFn<R, Resp>>,
}

impl<R, Resp> Clone for ResponseInterceptor<R, Resp> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<R: Request, Resp> ResponseInterceptor<R, Resp> {
    /// Creates an interceptor from a fallible hook.
    pub fn new<F>(name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Context<R>, &Resp) -> Result<(), InterceptorError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            hook: Arc::new(hook),
        }
    }

    /// Creates an interceptor from a hook that cannot fail.
    pub fn infallible<F>(name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Context<R>, &Resp) + Send + Sync + 'static,
    {
        Self::new(name, move |ctx, resp| {
            hook(ctx, resp);
            Ok(())
        })
    }

    /// Returns the interceptor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the hook.
    pub fn process(&self, ctx: &Context<R>, response: &Resp) -> Result<(), InterceptorError> {
        (self.hook)(ctx, response)
    }
}

impl<R, Resp> fmt::Debug for ResponseInterceptor<R, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseInterceptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
