//! # Parley Adapter for Alexa
//!
//! This crate plugs the Alexa Skills request/response model into the
//! [`parley_core`] router.
//!
//! ## Overview
//!
//! - [`RequestEnvelope`] implements [`parley_core::Request`]; its kind is the
//!   wire `type` of the inner request (`"LaunchRequest"`, `"IntentRequest"`,
//!   `"Connections.Response"`, ...)
//! - [`ResponseBuilder`] produces the [`ResponseEnvelope`] returned by handlers
//! - [`predicates`] provides the usual `is_request_type` / `is_intent_name`
//!   checks
//! - [`ReminderClient`] is the interface to the reminder backend, with
//!   [`HttpReminderClient`] as the production implementation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley_adapter_alexa::{ResponseBuilder, SkillBuilder, SkillHandler, predicates::*};
//!
//! let mut builder = SkillBuilder::new();
//! builder.add_request_handler(
//!     SkillHandler::new("launch", |_| Ok(ResponseBuilder::new().speak("Hi").build()))
//!         .rule(is_request_type("LaunchRequest")),
//! );
//! let skill = builder.build();
//! ```

pub mod builder;
pub mod model;
pub mod predicates;
pub mod reminder;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::ResponseBuilder;
pub use model::{Card, Directive, RequestEnvelope, ResponseEnvelope, SkillRequest};
pub use predicates::{is_connections_response, is_intent_name, is_request_type};
pub use reminder::{ApiAccess, HttpReminderClient, ReminderClient, ReminderError, ReminderResult};

use parley_core::{
    Context, Dispatcher, DispatcherBuilder, ExceptionHandler, RequestHandler, RequestInterceptor,
    ResponseInterceptor,
};

/// Context of one Alexa dispatch cycle.
pub type SkillContext = Context<RequestEnvelope>;
/// Builder for an Alexa skill dispatcher.
pub type SkillBuilder = DispatcherBuilder<RequestEnvelope, ResponseEnvelope>;
/// A sealed Alexa skill dispatcher.
pub type Skill = Dispatcher<RequestEnvelope, ResponseEnvelope>;
/// A request handler producing Alexa responses.
pub type SkillHandler = RequestHandler<RequestEnvelope, ResponseEnvelope>;
/// An exception handler turning a failed action into an Alexa response.
pub type SkillExceptionHandler = ExceptionHandler<RequestEnvelope, ResponseEnvelope>;
/// A hook run before handler selection on every Alexa request.
pub type SkillRequestInterceptor = RequestInterceptor<RequestEnvelope>;
/// A hook run on every Alexa response before it is returned.
pub type SkillResponseInterceptor = ResponseInterceptor<RequestEnvelope, ResponseEnvelope>;
