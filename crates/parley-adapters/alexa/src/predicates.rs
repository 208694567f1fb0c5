//! Request predicates for Alexa handlers.
//!
//! These build [`Predicate`]s over [`RequestEnvelope`] and compose with the
//! core combinators:
//!
//! ```rust,ignore
//! let create = is_intent_name("CreateReminderIntent").or(is_intent_name("AMAZON.YesIntent"));
//! ```

use parley_core::{Context, Predicate};

use crate::model::{RequestEnvelope, SkillRequest};

/// Matches requests whose `type` is `request_type`.
pub fn is_request_type(request_type: impl Into<String>) -> Predicate<RequestEnvelope> {
    Predicate::kind_is(request_type)
}

/// Matches intent requests for the intent named `name`.
pub fn is_intent_name(name: impl Into<String>) -> Predicate<RequestEnvelope> {
    let name = name.into();
    Predicate::new(move |ctx: &Context<RequestEnvelope>| {
        ctx.request().intent_name() == Some(name.as_str())
    })
}

/// Matches `Connections.Response` requests for the task named `name`.
pub fn is_connections_response(name: impl Into<String>) -> Predicate<RequestEnvelope> {
    let name = name.into();
    Predicate::new(move |ctx: &Context<RequestEnvelope>| {
        matches!(
            &ctx.request().request,
            SkillRequest::ConnectionsResponse { name: n, .. } if *n == name
        )
    })
}
