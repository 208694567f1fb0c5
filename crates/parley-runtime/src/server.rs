//! HTTP endpoint that feeds posted JSON requests through a dispatcher.
//!
//! Each POST body is decoded into the adapter's request envelope, routed on a
//! blocking worker thread, and the response envelope is written back as JSON.
//!
//! | Outcome                         | Status |
//! |---------------------------------|--------|
//! | response produced               | 200    |
//! | body is not a valid request     | 400    |
//! | dispatch or encoding failed     | 500    |

use std::future::Future;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use parley_core::{DispatchError, Dispatcher, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{RuntimeError, RuntimeResult};

const INTERNAL_ERROR_BODY: &str = "internal server error";

/// Failure to turn a request body into a response body.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The body is not a valid request envelope.
    #[error("invalid request body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Routing failed fatally.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The response could not be serialized.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl InvokeError {
    /// HTTP status reported for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Decodes `body`, dispatches it and encodes the response.
pub fn invoke_json<R, Resp>(
    dispatcher: &Dispatcher<R, Resp>,
    body: &[u8],
) -> Result<Vec<u8>, InvokeError>
where
    R: Request + DeserializeOwned,
    Resp: Serialize,
{
    let request: R = serde_json::from_slice(body).map_err(InvokeError::Decode)?;
    let response = dispatcher.dispatch(request)?;
    serde_json::to_vec(&response).map_err(InvokeError::Encode)
}

/// Serves a dispatcher over HTTP.
#[derive(Debug, Clone)]
pub struct SkillServer {
    addr: String,
    path: String,
}

impl SkillServer {
    /// Creates a server that binds `addr` and accepts POSTs on `path`.
    pub fn new(addr: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Self {
            addr: addr.into(),
            path,
        }
    }

    /// Creates a server from the `[server]` configuration section.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.addr(), config.path.clone())
    }

    /// The configured bind address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The configured request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds the axum router for `dispatcher`.
    pub fn router<R, Resp>(&self, dispatcher: Dispatcher<R, Resp>) -> Router
    where
        R: Request + DeserializeOwned,
        Resp: Serialize + Send + 'static,
    {
        Router::new()
            .route(&self.path, post(invoke_handler::<R, Resp>))
            .with_state(dispatcher)
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve<R, Resp, F>(
        &self,
        dispatcher: Dispatcher<R, Resp>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        R: Request + DeserializeOwned,
        Resp: Serialize + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|source| RuntimeError::Bind {
                addr: self.addr.clone(),
                source,
            })?;

        self.serve_with_listener(listener, dispatcher, shutdown)
            .await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_listener<R, Resp, F>(
        &self,
        listener: TcpListener,
        dispatcher: Dispatcher<R, Resp>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        R: Request + DeserializeOwned,
        Resp: Serialize + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, path = %self.path, "HTTP server listening");

        axum::serve(listener, self.router(dispatcher))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn invoke_handler<R, Resp>(
    State(dispatcher): State<Dispatcher<R, Resp>>,
    body: Bytes,
) -> Response
where
    R: Request + DeserializeOwned,
    Resp: Serialize + Send + 'static,
{
    // Handlers may block on outbound HTTP calls
    let result = tokio::task::spawn_blocking(move || invoke_json(&dispatcher, &body)).await;

    match result {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(Err(e)) if e.status_code() == StatusCode::BAD_REQUEST => {
            warn!(error = %e, "Rejected request");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Ok(Err(e)) => {
            // Internal detail stays in the log
            error!(error = %e, "Request failed");
            (e.status_code(), INTERNAL_ERROR_BODY).into_response()
        }
        Err(e) => {
            error!(error = %e, "Dispatch task aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
        }
    }
}
