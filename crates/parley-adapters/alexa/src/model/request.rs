//! Inbound request envelope.
//!
//! Only the parts of the platform payload that skills actually read are
//! modelled. Unknown fields are ignored, and request types the adapter does
//! not know about decode as [`SkillRequest::Unsupported`] instead of failing.
//!
//! ```text
//! RequestEnvelope { version, session?, context.System, request }
//! └── SkillRequest (tag = "type")
//!     ├── LaunchRequest
//!     ├── IntentRequest        { intent { name, slots, confirmationStatus } }
//!     ├── SessionEndedRequest  { reason, error }
//!     ├── Connections.Response { name, status, payload, token }
//!     └── Unsupported
//! ```

use std::collections::BTreeMap;

use parley_core::Request;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The complete payload posted by the platform for one user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Envelope format version, currently `"1.0"`.
    pub version: String,
    /// Session state; absent for out-of-session requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    /// Device and user state.
    pub context: PlatformContext,
    /// The request itself.
    pub request: SkillRequest,
}

impl RequestEnvelope {
    /// Parses an envelope from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Returns the request `type` string.
    pub fn request_type(&self) -> &str {
        self.request.request_type()
    }

    /// Returns the intent name for intent requests.
    pub fn intent_name(&self) -> Option<&str> {
        match &self.request {
            SkillRequest::IntentRequest { intent, .. } => Some(&intent.name),
            _ => None,
        }
    }

    /// Returns the locale of the request, if the platform sent one.
    pub fn locale(&self) -> Option<&str> {
        self.request.locale()
    }

    /// Returns the consent token granted by the user, if any.
    pub fn consent_token(&self) -> Option<&str> {
        self.context
            .system
            .user
            .permissions
            .as_ref()
            .and_then(|p| p.consent_token.as_deref())
    }
}

impl Request for RequestEnvelope {
    fn kind(&self) -> &str {
        self.request_type()
    }
}

/// Session information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// `true` for the first request of a session.
    #[serde(default)]
    pub new: bool,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Attributes carried over from the previous response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
}

/// The `context` object of the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformContext {
    #[serde(rename = "System")]
    pub system: SystemState,
}

/// The `context.System` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    pub application: Application,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    /// Base URL of the platform service APIs for this request's region.
    pub api_endpoint: String,
    /// Short-lived token authorising calls to the platform service APIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

/// Permissions the user has granted to the skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    #[serde(default)]
    pub supported_interfaces: Map<String, Value>,
}

/// The `request` object, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SkillRequest {
    /// The user opened the skill without a specific intent.
    LaunchRequest {
        request_id: String,
        timestamp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locale: Option<String>,
    },
    /// The user spoke an utterance mapped to an intent.
    IntentRequest {
        request_id: String,
        timestamp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locale: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dialog_state: Option<String>,
        intent: Intent,
    },
    /// The session ended for a reason other than the skill closing it.
    SessionEndedRequest {
        request_id: String,
        timestamp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locale: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<SessionEndedError>,
    },
    /// The result of a `Connections.SendRequest` directive, e.g. a
    /// permission consent prompt.
    #[serde(rename = "Connections.Response")]
    ConnectionsResponse {
        request_id: String,
        timestamp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locale: Option<String>,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<ConnectionsStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Map<String, Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Any request type not modelled above.
    #[serde(other)]
    Unsupported,
}

impl SkillRequest {
    /// Returns the wire `type` of this request.
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::LaunchRequest { .. } => "LaunchRequest",
            Self::IntentRequest { .. } => "IntentRequest",
            Self::SessionEndedRequest { .. } => "SessionEndedRequest",
            Self::ConnectionsResponse { .. } => "Connections.Response",
            Self::Unsupported => "Unsupported",
        }
    }

    /// Returns the locale of the request, if present.
    pub fn locale(&self) -> Option<&str> {
        match self {
            Self::LaunchRequest { locale, .. }
            | Self::IntentRequest { locale, .. }
            | Self::SessionEndedRequest { locale, .. }
            | Self::ConnectionsResponse { locale, .. } => locale.as_deref(),
            Self::Unsupported => None,
        }
    }
}

/// An intent with its slot values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, Slot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEndedError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

/// Transport-level status of a connections response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionsStatus {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
