//! Parley Runtime - Hosting layer for Parley skills.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `ParleyConfig`)
//! - Logging configuration (`LoggingBuilder`, `SpanEvents`)
//! - An HTTP endpoint that feeds JSON requests through a dispatcher (`SkillServer`)
//! - Runtime orchestration (`ParleyRuntime`)
//!
//! Configuration is read from `parley.toml` (or `config.toml`), an optional
//! profile variant such as `parley.production.toml`, and `PARLEY_` prefixed
//! environment variables, with `__` separating nested keys:
//!
//! ```text
//! PARLEY_SERVER__PORT=8080
//! PARLEY_LOGGING__LEVEL=debug
//! PARLEY_DISPATCH__INTERCEPTOR_FAILURES=propagate
//! ```
//!
//! ```ignore
//! use parley_runtime::ParleyRuntime;
//!
//! fn main() -> anyhow::Result<()> {
//!     let runtime = ParleyRuntime::builder().build()?;
//!     let skill = my_skill(runtime.interceptor_policy());
//!
//!     // Serve until Ctrl+C
//!     runtime.serve(skill)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod server;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, ParleyConfig, Profile};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{ParleyRuntime, RuntimeBuilder, shutdown_signal};
pub use server::{InvokeError, SkillServer, invoke_json};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
