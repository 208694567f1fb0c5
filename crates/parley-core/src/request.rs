//! The request abstraction routed by the dispatcher.

/// A routable request payload.
///
/// The router never looks inside a request beyond its [`kind`](Request::kind),
/// a discriminant such as `"LaunchRequest"` or `"intent:Help"` that predicates
/// typically match on. Everything else is domain data read by handler actions.
pub trait Request: Send + Sync + 'static {
    /// Returns the discriminant of this request.
    fn kind(&self) -> &str;
}
