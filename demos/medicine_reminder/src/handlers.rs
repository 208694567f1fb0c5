//! Request and exception handlers of the medicine reminder skill.
//!
//! Handlers are tried in registration order and the first match wins, so
//! [`intent_reflector`] must stay last: it accepts every intent request.

use std::sync::Arc;

use parley::alexa::predicates::{is_connections_response, is_intent_name, is_request_type};
use parley::alexa::{
    ApiAccess, Card, Directive, ReminderClient, ReminderError, ResponseBuilder, ResponseEnvelope,
    SkillContext, SkillExceptionHandler, SkillHandler, SkillRequest,
};
use parley::core::{HandlerError, HandlerResult};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::settings::SkillSettings;

pub const WELCOME_MESSAGE: &str = "Welcome to the medicine reminder sample skill. You can say set a reminder to set reminder in next 5 minutes. What do you want to ask?";
pub const WHAT_DO_YOU_WANT: &str = "What do you want to ask?";
pub const ERROR_MESSAGE: &str = "Uh Oh. Looks like something went wrong.";
pub const GOOD_BYE: &str = "Goodbye !!";
pub const HELP_MESSAGE: &str =
    "To use this skill say set a reminder which will set a reminder for next 5 minutes.";
pub const REMINDER_CREATED: &str = "Your medicine reminder created";
pub const GRANT_WITH_CARD: &str =
    "Please provide Reminder permission using the card I have sent to your Alexa app.";
pub const GRANT_LATER: &str = "You can grant permission anytime by going to Alexa app";
pub const SCHEDULE_PROMPT: &str = "Do you want to schedule a medicine reminder?";
pub const SCHEDULE_REPROMPT: &str = "What do you want to do?";

/// Name of the consent task started by [`ask_for_permission`].
pub const ASK_FOR_TASK: &str = "AskFor";
pub const CORRELATION_TOKEN: &str = "correlationToken";

/// The request handler chain, in dispatch order.
pub fn request_handlers() -> Vec<SkillHandler> {
    vec![
        SkillHandler::new("LaunchRequestHandler", launch).rule(is_request_type("LaunchRequest")),
        SkillHandler::new("CreateReminderIntentHandler", create_reminder).rule(
            is_request_type("IntentRequest").and(
                is_intent_name("CreateReminderIntent").or(is_intent_name("AMAZON.YesIntent")),
            ),
        ),
        SkillHandler::new("ConnectionsResponseHandler", connections_response)
            .rule(is_connections_response(ASK_FOR_TASK)),
        SkillHandler::new("HelpIntentHandler", help).rule(is_intent_name("AMAZON.HelpIntent")),
        SkillHandler::new("CancelOrStopIntentHandler", cancel_or_stop).rule(
            is_intent_name("AMAZON.CancelIntent").or(is_intent_name("AMAZON.StopIntent")),
        ),
        SkillHandler::new("SessionEndedRequestHandler", session_ended)
            .rule(is_request_type("SessionEndedRequest")),
        SkillHandler::new("IntentReflectorHandler", intent_reflector)
            .rule(is_request_type("IntentRequest")),
    ]
}

/// Catch-all exception handler: logs the failure and apologises.
pub fn catch_all_exception_handler() -> SkillExceptionHandler {
    SkillExceptionHandler::new("CatchAllExceptionHandler", |ctx, err| {
        error!(
            error = %err,
            cause = ?err.cause(),
            request_type = ctx.request().request_type(),
            "Request handling failed"
        );
        Ok(ResponseBuilder::new()
            .speak(ERROR_MESSAGE)
            .ask(ERROR_MESSAGE)
            .build())
    })
}

fn launch(_ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    Ok(ResponseBuilder::new()
        .speak(WELCOME_MESSAGE)
        .ask(WHAT_DO_YOU_WANT)
        .build())
}

fn create_reminder(ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    info!("Reminder intent handler");
    let settings = ctx.require_service::<SkillSettings>()?;
    let envelope = ctx.request();

    if envelope.consent_token().is_none() {
        return Ok(ResponseBuilder::new()
            .add_directive(ask_for_permission(&settings.permission_scope))
            .build());
    }

    let client: Arc<dyn ReminderClient> = ctx.require_service::<dyn ReminderClient>()?;
    let access = ApiAccess::from_envelope(envelope).map_err(HandlerError::from_error)?;
    let reminder = settings
        .reminder_request(OffsetDateTime::now_utc())
        .map_err(HandlerError::from_error)?;

    match client.create_reminder(&access, &reminder) {
        Ok(created) => {
            info!(
                alert_token = created.alert_token.as_deref().unwrap_or_default(),
                status = created.status.as_deref().unwrap_or_default(),
                "Reminder created"
            );
        }
        Err(ReminderError::Service { status, body }) => {
            info!(status, body = %body, "Reminder service rejected the request");
            return Ok(ResponseBuilder::new().speak(ERROR_MESSAGE).build());
        }
        Err(e) => return Err(HandlerError::with_source("failed to create reminder", e)),
    }

    Ok(ResponseBuilder::new()
        .speak(REMINDER_CREATED)
        .set_card(Card::simple("Medicine Reminder", "Medicine Reminder created"))
        .build())
}

/// The `Connections.SendRequest` directive that prompts for reminder consent.
pub fn ask_for_permission(scope: &str) -> Directive {
    let mut payload = Map::new();
    payload.insert(
        "@type".into(),
        Value::from("AskForPermissionsConsentRequest"),
    );
    payload.insert("@version".into(), Value::from("1"));
    payload.insert("permissionScope".into(), Value::from(scope));

    Directive::SendRequest {
        name: ASK_FOR_TASK.to_string(),
        payload,
        token: CORRELATION_TOKEN.to_string(),
    }
}

fn connections_response(ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    info!("In connections response handler");

    let SkillRequest::ConnectionsResponse { payload, .. } = &ctx.request().request else {
        return Err(HandlerError::new("expected a Connections.Response request"));
    };
    let status = payload
        .as_ref()
        .and_then(|p| p.get("status"))
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::new("Connections.Response payload has no status"))?;

    let response = match status {
        "NOT_ANSWERED" => {
            let settings = ctx.require_service::<SkillSettings>()?;
            ResponseBuilder::new()
                .speak(GRANT_WITH_CARD)
                .set_card(Card::ask_for_permissions([settings.permission_scope.as_str()]))
        }
        "DENIED" => ResponseBuilder::new().speak(GRANT_LATER),
        _ => ResponseBuilder::new()
            .speak(SCHEDULE_PROMPT)
            .ask(SCHEDULE_REPROMPT),
    };

    Ok(response.build())
}

fn help(_ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    Ok(ResponseBuilder::new()
        .speak(HELP_MESSAGE)
        .ask(WHAT_DO_YOU_WANT)
        .build())
}

fn cancel_or_stop(_ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    Ok(ResponseBuilder::new().speak(GOOD_BYE).build())
}

fn session_ended(_ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    Ok(ResponseBuilder::new().build())
}

/// Repeats the intent back; useful while testing the interaction model.
fn intent_reflector(ctx: &SkillContext) -> HandlerResult<ResponseEnvelope> {
    let intent = ctx.request().intent_name().unwrap_or_default();
    Ok(ResponseBuilder::new()
        .speak(format!("You just triggered {intent}"))
        .build())
}
