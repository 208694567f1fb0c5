//! Reminder management client.
//!
//! Skills talk to the reminder backend only through the [`ReminderClient`]
//! trait, so handlers can be exercised against an in-memory double while
//! production wires in [`HttpReminderClient`].

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ReminderRequest, ReminderResponse, RequestEnvelope};

/// Path of the reminder creation endpoint, relative to the API endpoint.
pub const REMINDERS_PATH: &str = "/v1/alerts/reminders";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by a [`ReminderClient`].
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The backend answered with a non-success status.
    #[error("reminder service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The request could not be sent or the answer could not be read.
    #[error("reminder transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request envelope carried no API access token.
    #[error("request carries no API access token")]
    MissingApiAccess,
}

/// Result type for reminder operations.
pub type ReminderResult<T> = Result<T, ReminderError>;

/// Where and as whom to call the platform APIs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiAccess {
    pub endpoint: String,
    pub token: String,
}

impl ApiAccess {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Extracts the API endpoint and access token from a request.
    pub fn from_envelope(envelope: &RequestEnvelope) -> ReminderResult<Self> {
        let system = &envelope.context.system;
        let token = system
            .api_access_token
            .as_deref()
            .ok_or(ReminderError::MissingApiAccess)?;
        Ok(Self::new(system.api_endpoint.clone(), token))
    }
}

/// The fixed interface through which skills create reminders.
pub trait ReminderClient: Send + Sync {
    /// Creates a reminder on behalf of the user identified by `access`.
    fn create_reminder(
        &self,
        access: &ApiAccess,
        request: &ReminderRequest,
    ) -> ReminderResult<ReminderResponse>;
}

/// [`ReminderClient`] backed by the platform's HTTP API.
///
/// Uses a blocking client: handler actions run synchronously inside a
/// dispatch cycle. Build it outside any async runtime.
#[derive(Debug, Clone)]
pub struct HttpReminderClient {
    client: Client,
}

impl HttpReminderClient {
    /// Creates a client with a 30 second timeout.
    pub fn new() -> ReminderResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> ReminderResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps a preconfigured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl ReminderClient for HttpReminderClient {
    fn create_reminder(
        &self,
        access: &ApiAccess,
        request: &ReminderRequest,
    ) -> ReminderResult<ReminderResponse> {
        let url = format!("{}{}", access.endpoint.trim_end_matches('/'), REMINDERS_PATH);
        debug!(url = %url, "Creating reminder");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&access.token)
            .json(request)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Reminder service rejected request");
            return Err(ReminderError::Service {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json()?)
    }
}
