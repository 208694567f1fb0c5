//! Outbound response envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version string of the response format.
pub const RESPONSE_FORMAT_VERSION: &str = "1.0";

/// The complete payload returned to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<Map<String, Value>>,
    pub response: Response,
}

impl ResponseEnvelope {
    /// Wraps a response in an envelope of the current format version.
    pub fn new(response: Response) -> Self {
        Self {
            version: RESPONSE_FORMAT_VERSION.to_string(),
            session_attributes: None,
            response,
        }
    }
}

impl Default for ResponseEnvelope {
    fn default() -> Self {
        Self::new(Response::default())
    }
}

/// What the device should say, show and do next.
///
/// Every field is optional; an empty response closes the interaction
/// silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

/// Spoken output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
    PlainText { text: String },
}

impl OutputSpeech {
    /// Returns the raw SSML or plain text.
    pub fn content(&self) -> &str {
        match self {
            Self::Ssml { ssml } => ssml,
            Self::PlainText { text } => text,
        }
    }
}

/// Speech played if the user does not answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// A card rendered in the companion app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Card {
    Simple {
        title: String,
        content: String,
    },
    /// Asks the user to grant the listed permission scopes.
    AskForPermissionsConsent { permissions: Vec<String> },
}

impl Card {
    /// A simple title and body card.
    pub fn simple(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Simple {
            title: title.into(),
            content: content.into(),
        }
    }

    /// A permissions consent card for the given scopes.
    pub fn ask_for_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AskForPermissionsConsent {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// A directive sent along with the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    /// Hands the interaction to a platform task such as a consent prompt;
    /// the outcome arrives later as a `Connections.Response` request.
    #[serde(rename = "Connections.SendRequest")]
    SendRequest {
        name: String,
        payload: Map<String, Value>,
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_response_serializes_to_empty_object() {
        let value = serde_json::to_value(ResponseEnvelope::default()).unwrap();
        assert_eq!(value, json!({ "version": "1.0", "response": {} }));
    }

    #[test]
    fn test_card_and_directive_wire_format() {
        let mut payload = Map::new();
        payload.insert("@version".into(), json!("1"));

        let response = Response {
            card: Some(Card::ask_for_permissions(["alexa::alerts:reminders:skill:readwrite"])),
            directives: vec![Directive::SendRequest {
                name: "AskFor".into(),
                payload,
                token: "correlationToken".into(),
            }],
            ..Response::default()
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "card": {
                    "type": "AskForPermissionsConsent",
                    "permissions": ["alexa::alerts:reminders:skill:readwrite"]
                },
                "directives": [{
                    "type": "Connections.SendRequest",
                    "name": "AskFor",
                    "payload": { "@version": "1" },
                    "token": "correlationToken"
                }]
            })
        );
    }
}
