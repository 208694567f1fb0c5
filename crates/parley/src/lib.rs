//! # Parley
//!
//! Predicate-dispatch request routing for voice assistant skills.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────────────────────────────────────┐
//! │ SkillServer  │────▶│ Dispatcher                                           │
//! │ (HTTP, JSON) │     │  request interceptors ─▶ first matching handler ─┐   │
//! └──────────────┘     │  response interceptors ◀─ exception handlers ◀───┘   │
//!                      └──────────────────────────────────────────────────────┘
//! ```
//!
//! - **Runtime**: Loads configuration, sets up logging, serves HTTP
//! - **Dispatcher**: Sealed, ordered handler chains; one response per request
//! - **Adapters**: Platform request and response models (Alexa)
//! - **Handlers**: Predicate plus action; the first registered match wins
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::prelude::*;
//! use parley::alexa::{ResponseBuilder, predicates};
//!
//! fn main() -> anyhow::Result<()> {
//!     let runtime = ParleyRuntime::builder().build()?;
//!
//!     let mut builder = SkillBuilder::new();
//!     builder
//!         .add_request_handler(
//!             SkillHandler::new("launch", |_| {
//!                 Ok(ResponseBuilder::new().speak("Hello").build())
//!             })
//!             .rule(predicates::is_request_type("LaunchRequest")),
//!         )
//!         .interceptor_policy(runtime.interceptor_policy());
//!
//!     runtime.serve(builder.build())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `alexa`: Alexa request/response model and reminders client (default)
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use parley_core as core;
pub use parley_runtime as runtime;

#[cfg(feature = "alexa")]
pub use parley_adapter_alexa as alexa;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use parley::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use parley_runtime::{ParleyConfig, ParleyRuntime, RuntimeBuilder, SkillServer};

    // Routing
    pub use parley_core::{
        Context, DispatchError, Dispatcher, DispatcherBuilder, ExceptionHandler, HandlerError,
        HandlerResult, InterceptorError, InterceptorPolicy, Predicate, Request, RequestHandler,
        RequestInterceptor, ResponseInterceptor,
    };

    // Alexa
    #[cfg(feature = "alexa")]
    pub use parley_adapter_alexa::{
        RequestEnvelope, ResponseBuilder, ResponseEnvelope, Skill, SkillBuilder, SkillContext,
        SkillExceptionHandler, SkillHandler, SkillRequestInterceptor, SkillResponseInterceptor,
    };

    // Logging
    pub use parley_runtime::prelude::*;
}
