//! Error types for the Parley router.

use thiserror::Error;

/// Boxed error type used as the optional cause of handler and hook failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The failure of a request-handler action.
///
/// A `HandlerError` is recoverable: the dispatcher hands it to the exception
/// handler chain, and only becomes fatal if no exception handler accepts it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl HandlerError {
    /// Creates a handler error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error that wraps an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps any error, reusing its display text as the message.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns `true` if the underlying cause is of type `E`.
    pub fn is<E: std::error::Error + 'static>(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is::<E>())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// The failure of a request or response interceptor.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InterceptorError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl InterceptorError {
    /// Creates an interceptor error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an interceptor error that wraps an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fatal outcomes of a dispatch cycle.
///
/// Every variant means no response was produced. The transport adapter is
/// expected to map these onto a transport-level failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered request handler matched; indicates a missing catch-all.
    #[error("no request handler can handle request of kind '{kind}'")]
    NoHandlerFound {
        /// Kind of the unmatched request.
        kind: String,
    },

    /// A handler error escaped the exception handler chain.
    ///
    /// `exception_handler` is `None` when no exception handler matched, and
    /// names the exception handler when its own action failed.
    #[error("unhandled error from handler '{handler}': {source}")]
    UnhandledHandlerError {
        /// Name of the request handler whose action failed.
        handler: String,
        /// Name of the exception handler that failed, if one was selected.
        exception_handler: Option<String>,
        /// The error that escaped.
        source: HandlerError,
    },

    /// A predicate panicked while the handler chains were scanned.
    #[error("predicate of '{handler}' failed: {message}")]
    PredicateFailed {
        /// Name of the handler whose predicate failed.
        handler: String,
        /// Panic message.
        message: String,
    },

    /// An interceptor failed under
    /// [`InterceptorPolicy::Propagate`](crate::InterceptorPolicy::Propagate).
    #[error("interceptor '{interceptor}' failed: {source}")]
    InterceptorFailed {
        /// Name of the failing interceptor.
        interceptor: String,
        /// The interceptor's error.
        source: InterceptorError,
    },
}

impl DispatchError {
    /// Returns `true` if this error means the registry has no matching handler.
    pub fn is_no_handler(&self) -> bool {
        matches!(self, Self::NoHandlerFound { .. })
    }

    /// Returns `true` if a handler error escaped the exception chain.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::UnhandledHandlerError { .. })
    }
}

/// Result type for handler and exception-handler actions.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Result type for a whole dispatch cycle.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("backend down")]
    struct BackendDown;

    #[test]
    fn test_handler_error_keeps_source() {
        let err = HandlerError::with_source("create failed", BackendDown);
        assert_eq!(err.to_string(), "create failed");
        assert!(err.is::<BackendDown>());
        assert_eq!(err.source().map(|s| s.to_string()), Some("backend down".into()));
    }

    #[test]
    fn test_from_error_uses_display() {
        let err = HandlerError::from_error(BackendDown);
        assert_eq!(err.message(), "backend down");
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_unhandled_display_mentions_handler() {
        let err = DispatchError::UnhandledHandlerError {
            handler: "reminder".into(),
            exception_handler: None,
            source: HandlerError::new("boom"),
        };
        assert!(err.is_unhandled());
        assert_eq!(err.to_string(), "unhandled error from handler 'reminder': boom");
    }
}
