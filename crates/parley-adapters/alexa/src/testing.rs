//! Request fixtures for handler tests.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::{
    Application, ConnectionsStatus, Intent, Permissions, PlatformContext, RequestEnvelope,
    Session, SkillRequest, SystemState, User,
};

/// Default API endpoint used by fixtures.
pub const API_ENDPOINT: &str = "https://api.amazonalexa.com";

/// Default API access token used by fixtures.
pub const API_ACCESS_TOKEN: &str = "test-access-token";

/// Wraps `request` in an envelope without a consent token.
pub fn envelope(request: SkillRequest) -> RequestEnvelope {
    let user = User {
        user_id: "amzn1.ask.account.test".into(),
        access_token: None,
        permissions: None,
    };
    let application = Application {
        application_id: "amzn1.ask.skill.test".into(),
    };

    RequestEnvelope {
        version: "1.0".into(),
        session: Some(Session {
            new: true,
            session_id: "amzn1.echo-api.session.test".into(),
            application: Some(application.clone()),
            user: Some(user.clone()),
            attributes: None,
        }),
        context: PlatformContext {
            system: SystemState {
                application,
                user,
                device: None,
                api_endpoint: API_ENDPOINT.into(),
                api_access_token: Some(API_ACCESS_TOKEN.into()),
            },
        },
        request,
    }
}

/// Grants a consent token on `envelope`.
pub fn with_consent(mut envelope: RequestEnvelope, token: &str) -> RequestEnvelope {
    envelope.context.system.user.permissions = Some(Permissions {
        consent_token: Some(token.into()),
    });
    envelope
}

pub fn launch_request() -> RequestEnvelope {
    envelope(SkillRequest::LaunchRequest {
        request_id: "req-launch".into(),
        timestamp: "2024-05-01T10:00:00Z".into(),
        locale: Some("en-US".into()),
    })
}

pub fn intent_request(name: &str) -> RequestEnvelope {
    envelope(SkillRequest::IntentRequest {
        request_id: "req-intent".into(),
        timestamp: "2024-05-01T10:00:00Z".into(),
        locale: Some("en-US".into()),
        dialog_state: None,
        intent: Intent {
            name: name.into(),
            confirmation_status: Some("NONE".into()),
            slots: BTreeMap::new(),
        },
    })
}

pub fn session_ended_request() -> RequestEnvelope {
    envelope(SkillRequest::SessionEndedRequest {
        request_id: "req-ended".into(),
        timestamp: "2024-05-01T10:00:00Z".into(),
        locale: Some("en-US".into()),
        reason: Some("USER_INITIATED".into()),
        error: None,
    })
}

/// A `Connections.Response` for task `name`; `status` becomes the payload's
/// `status` field when given.
pub fn connections_response(name: &str, status: Option<&str>) -> RequestEnvelope {
    let mut payload = Map::new();
    payload.insert(
        "permissionScope".into(),
        Value::from("alexa::alerts:reminders:skill:readwrite"),
    );
    if let Some(status) = status {
        payload.insert("status".into(), Value::from(status));
    }

    envelope(SkillRequest::ConnectionsResponse {
        request_id: "req-connections".into(),
        timestamp: "2024-05-01T10:00:00Z".into(),
        locale: Some("en-US".into()),
        name: name.into(),
        status: Some(ConnectionsStatus {
            code: "200".into(),
            message: "OK".into(),
        }),
        payload: Some(payload),
        token: Some("correlationToken".into()),
    })
}
