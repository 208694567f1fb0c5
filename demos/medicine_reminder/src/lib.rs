//! Medicine Reminder Skill
//!
//! An Alexa skill that schedules a recurring medicine reminder, asking the
//! user for reminder permissions first when needed.
//!
//! # Handler Chain
//!
//! ```text
//! LaunchRequest                          -> welcome
//! CreateReminderIntent | AMAZON.YesIntent -> consent prompt or create reminder
//! Connections.Response "AskFor"          -> react to the consent outcome
//! AMAZON.HelpIntent                      -> help
//! AMAZON.CancelIntent | AMAZON.StopIntent -> goodbye
//! SessionEndedRequest                    -> empty response
//! any other IntentRequest                -> "You just triggered <intent>"
//! ```
//!
//! Any handler failure is answered by a single catch-all exception handler.

pub mod handlers;
pub mod interceptors;
pub mod settings;

use std::sync::Arc;

use parley::alexa::{ReminderClient, Skill, SkillBuilder};
use parley::core::InterceptorPolicy;

pub use settings::{SettingsError, SkillSettings};

/// Wires the handlers, interceptors and services into a sealed skill.
pub fn build_skill(
    settings: SkillSettings,
    reminders: Arc<dyn ReminderClient>,
    policy: InterceptorPolicy,
) -> Skill {
    let mut builder = SkillBuilder::new();

    for handler in handlers::request_handlers() {
        builder.add_request_handler(handler);
    }

    builder
        .add_exception_handler(handlers::catch_all_exception_handler())
        .add_request_interceptor(interceptors::request_logger())
        .add_response_interceptor(interceptors::response_logger())
        .service(Arc::new(settings))
        .service(reminders)
        .interceptor_policy(policy);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use parley::alexa::model::{OutputSpeech, ReminderRequest, ReminderResponse, Response};
    use parley::alexa::testing::{
        API_ACCESS_TOKEN, API_ENDPOINT, connections_response, intent_request, launch_request,
        session_ended_request, with_consent,
    };
    use parley::alexa::{
        ApiAccess, Card, Directive, ReminderError, ReminderResult, RequestEnvelope,
        ResponseEnvelope, SkillRequest,
    };
    use parley::core::DispatchError;

    use crate::handlers::*;

    #[derive(Default)]
    struct MockReminders {
        reject: bool,
        calls: Mutex<Vec<(ApiAccess, ReminderRequest)>>,
    }

    impl MockReminders {
        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(ApiAccess, ReminderRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ReminderClient for MockReminders {
        fn create_reminder(
            &self,
            access: &ApiAccess,
            request: &ReminderRequest,
        ) -> ReminderResult<ReminderResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((access.clone(), request.clone()));
            if self.reject {
                return Err(ReminderError::Service {
                    status: 403,
                    body: r#"{"code":"FORBIDDEN"}"#.into(),
                });
            }
            Ok(ReminderResponse {
                alert_token: Some("alert-1".into()),
                status: Some("ON".into()),
                ..ReminderResponse::default()
            })
        }
    }

    fn skill_with(reminders: Arc<MockReminders>) -> Skill {
        build_skill(
            SkillSettings::default(),
            reminders,
            InterceptorPolicy::default(),
        )
    }

    fn dispatch(request: RequestEnvelope) -> Response {
        skill_with(Arc::new(MockReminders::default()))
            .dispatch(request)
            .unwrap()
            .response
    }

    fn speech(response: &Response) -> Option<&str> {
        response.output_speech.as_ref().map(OutputSpeech::content)
    }

    fn reprompt(response: &Response) -> Option<&str> {
        response
            .reprompt
            .as_ref()
            .map(|r| r.output_speech.content())
    }

    fn ssml(text: &str) -> String {
        format!("<speak>{text}</speak>")
    }

    #[test]
    fn test_handler_chain_order() {
        let skill = skill_with(Arc::new(MockReminders::default()));
        let names: Vec<_> = skill
            .registry()
            .request_handlers()
            .iter()
            .map(|h| h.name().to_string())
            .collect();

        assert_eq!(
            names,
            [
                "LaunchRequestHandler",
                "CreateReminderIntentHandler",
                "ConnectionsResponseHandler",
                "HelpIntentHandler",
                "CancelOrStopIntentHandler",
                "SessionEndedRequestHandler",
                "IntentReflectorHandler",
            ]
        );
    }

    #[test]
    fn test_launch_welcomes_and_keeps_session_open() {
        let response = dispatch(launch_request());
        assert_eq!(speech(&response), Some(ssml(WELCOME_MESSAGE).as_str()));
        assert_eq!(reprompt(&response), Some(ssml(WHAT_DO_YOU_WANT).as_str()));
        assert_eq!(response.should_end_session, Some(false));
    }

    #[test]
    fn test_create_reminder_without_consent_asks_for_permission() {
        let reminders = Arc::new(MockReminders::default());
        let response = skill_with(reminders.clone())
            .dispatch(intent_request("CreateReminderIntent"))
            .unwrap()
            .response;

        assert!(response.output_speech.is_none());
        assert_eq!(response.directives.len(), 1);
        let Directive::SendRequest {
            name,
            payload,
            token,
        } = &response.directives[0];
        assert_eq!(name, "AskFor");
        assert_eq!(token, "correlationToken");
        assert_eq!(payload["@type"], "AskForPermissionsConsentRequest");
        assert_eq!(payload["@version"], "1");
        assert_eq!(
            payload["permissionScope"],
            "alexa::alerts:reminders:skill:readwrite"
        );
        assert!(reminders.calls().is_empty());
    }

    #[test]
    fn test_create_reminder_with_consent() {
        let reminders = Arc::new(MockReminders::default());
        let request = with_consent(intent_request("CreateReminderIntent"), "consent-token");
        let response = skill_with(reminders.clone())
            .dispatch(request)
            .unwrap()
            .response;

        assert_eq!(speech(&response), Some(ssml(REMINDER_CREATED).as_str()));
        assert_eq!(
            response.card,
            Some(Card::simple("Medicine Reminder", "Medicine Reminder created"))
        );

        let calls = reminders.calls();
        assert_eq!(calls.len(), 1);
        let (access, reminder) = &calls[0];
        assert_eq!(access, &ApiAccess::new(API_ENDPOINT, API_ACCESS_TOKEN));
        assert_eq!(
            reminder.trigger.time_zone_id.as_deref(),
            Some("America/Los_Angeles")
        );
        assert_eq!(
            reminder.trigger.recurrence.as_ref().unwrap().recurrence_rules,
            SkillSettings::default().recurrence_rules
        );
        assert_eq!(reminder.trigger.scheduled_time.as_ref().unwrap().len(), 19);
    }

    #[test]
    fn test_yes_intent_creates_reminder() {
        let reminders = Arc::new(MockReminders::default());
        let request = with_consent(intent_request("AMAZON.YesIntent"), "consent-token");
        skill_with(reminders.clone()).dispatch(request).unwrap();
        assert_eq!(reminders.calls().len(), 1);
    }

    #[test]
    fn test_reminder_service_error_is_spoken() {
        let request = with_consent(intent_request("CreateReminderIntent"), "consent-token");
        let response = skill_with(Arc::new(MockReminders::rejecting()))
            .dispatch(request)
            .unwrap()
            .response;

        assert_eq!(speech(&response), Some(ssml(ERROR_MESSAGE).as_str()));
        assert!(response.reprompt.is_none());
    }

    #[test]
    fn test_missing_api_access_reaches_exception_handler() {
        let mut request = with_consent(intent_request("CreateReminderIntent"), "consent-token");
        request.context.system.api_access_token = None;

        let response = dispatch(request);
        assert_eq!(speech(&response), Some(ssml(ERROR_MESSAGE).as_str()));
        assert_eq!(reprompt(&response), Some(ssml(ERROR_MESSAGE).as_str()));
    }

    #[test]
    fn test_out_of_range_offset_reaches_exception_handler() {
        let reminders = Arc::new(MockReminders::default());
        let settings = SkillSettings {
            offset_minutes: 100_000_000_000,
            ..SkillSettings::default()
        };
        let skill = build_skill(settings, reminders.clone(), InterceptorPolicy::default());

        let request = with_consent(intent_request("CreateReminderIntent"), "consent-token");
        let response = skill.dispatch(request).unwrap().response;

        assert_eq!(speech(&response), Some(ssml(ERROR_MESSAGE).as_str()));
        assert!(reminders.calls().is_empty());
    }

    #[test]
    fn test_connections_response_outcomes() {
        let response = dispatch(connections_response("AskFor", Some("NOT_ANSWERED")));
        assert_eq!(speech(&response), Some(ssml(GRANT_WITH_CARD).as_str()));
        assert_eq!(
            response.card,
            Some(Card::ask_for_permissions([
                "alexa::alerts:reminders:skill:readwrite"
            ]))
        );

        let response = dispatch(connections_response("AskFor", Some("DENIED")));
        assert_eq!(speech(&response), Some(ssml(GRANT_LATER).as_str()));
        assert!(response.card.is_none());

        let response = dispatch(connections_response("AskFor", Some("ACCEPTED")));
        assert_eq!(speech(&response), Some(ssml(SCHEDULE_PROMPT).as_str()));
        assert_eq!(reprompt(&response), Some(ssml(SCHEDULE_REPROMPT).as_str()));
    }

    #[test]
    fn test_connections_response_without_status_fails_gracefully() {
        let response = dispatch(connections_response("AskFor", None));
        assert_eq!(speech(&response), Some(ssml(ERROR_MESSAGE).as_str()));
    }

    #[test]
    fn test_unrelated_connections_response_has_no_handler() {
        let result = skill_with(Arc::new(MockReminders::default()))
            .dispatch(connections_response("Buy", Some("ACCEPTED")));
        assert!(matches!(
            result,
            Err(DispatchError::NoHandlerFound { ref kind }) if kind == "Connections.Response"
        ));
    }

    #[test]
    fn test_help_and_goodbye() {
        let response = dispatch(intent_request("AMAZON.HelpIntent"));
        assert_eq!(speech(&response), Some(ssml(HELP_MESSAGE).as_str()));
        assert_eq!(reprompt(&response), Some(ssml(WHAT_DO_YOU_WANT).as_str()));

        for intent in ["AMAZON.CancelIntent", "AMAZON.StopIntent"] {
            let response = dispatch(intent_request(intent));
            assert_eq!(speech(&response), Some(ssml(GOOD_BYE).as_str()));
            assert!(response.reprompt.is_none());
        }
    }

    #[test]
    fn test_session_ended_returns_empty_response() {
        let envelope: ResponseEnvelope = skill_with(Arc::new(MockReminders::default()))
            .dispatch(session_ended_request())
            .unwrap();
        assert_eq!(
            serde_json::to_value(&envelope.response).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn test_intent_reflector_catches_other_intents() {
        let response = dispatch(intent_request("AMAZON.FallbackIntent"));
        assert_eq!(
            speech(&response),
            Some(ssml("You just triggered AMAZON.FallbackIntent").as_str())
        );
    }

    #[test]
    fn test_unsupported_request_has_no_handler() {
        let mut request = launch_request();
        request.request = SkillRequest::Unsupported;

        let result = skill_with(Arc::new(MockReminders::default())).dispatch(request);
        assert!(matches!(result, Err(DispatchError::NoHandlerFound { .. })));
    }
}
