//! Configuration module for Parley runtime.
//!
//! This module provides layered configuration loading and validation for
//! logging, the HTTP endpoint, router behaviour and skill settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, ParleyConfig,
    ServerConfig, SpanEventConfig,
};
pub use validation::validate_config;
