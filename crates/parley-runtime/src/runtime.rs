//! Skill runtime: configuration, logging and the HTTP endpoint in one place.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parley_runtime::ParleyRuntime;
//!
//! let runtime = ParleyRuntime::builder()
//!     .config_file("parley.toml")
//!     .profile("production")
//!     .build()?;
//!
//! let skill = build_skill(runtime.skill_settings()?, runtime.interceptor_policy());
//! runtime.serve(skill)?;
//! ```

use std::path::Path;

use parley_core::{Dispatcher, InterceptorPolicy, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::{ConfigLoader, ConfigResult, ParleyConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use crate::server::SkillServer;

/// Loaded configuration with logging initialized.
///
/// The runtime does not own a tokio runtime until [`serve`](Self::serve) is
/// called, so blocking clients can be built beforehand.
#[derive(Debug, Clone)]
pub struct ParleyRuntime {
    config: ParleyConfig,
}

impl ParleyRuntime {
    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and initializes logging.
    pub fn from_config(config: &ParleyConfig) -> Self {
        // try_init won't panic if already initialized
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            interceptor_failures = %config.dispatch.interceptor_failures,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    /// Returns the configured interceptor failure policy.
    pub fn interceptor_policy(&self) -> InterceptorPolicy {
        self.config.dispatch.interceptor_failures
    }

    /// Deserializes the `[skill]` section into the skill's settings type.
    pub fn skill_settings<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        self.config.skill_settings()
    }

    /// Returns an HTTP server for the configured address.
    pub fn server(&self) -> SkillServer {
        SkillServer::from_config(&self.config.server)
    }

    /// Serves `dispatcher` until Ctrl+C or SIGTERM.
    ///
    /// Blocks the calling thread on a fresh multi-threaded tokio runtime.
    pub fn serve<R, Resp>(&self, dispatcher: Dispatcher<R, Resp>) -> RuntimeResult<()>
    where
        R: Request + DeserializeOwned,
        Resp: Serialize + Send + 'static,
    {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let server = self.server();
        rt.block_on(server.serve(dispatcher, shutdown_signal()))
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c.await;
                info!("Received Ctrl+C, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("Received Ctrl+C, shutting down");
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`ParleyRuntime`] with custom configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: ParleyConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads and validates the configuration, then builds the runtime.
    pub fn build(self) -> RuntimeResult<ParleyRuntime> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(ParleyRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
