//! Alexa wire data model.

pub mod reminder;
pub mod request;
pub mod response;

pub use reminder::{
    AlertInfo, PushNotification, PushNotificationStatus, Recurrence, ReminderRequest,
    ReminderResponse, SpokenInfo, SpokenText, Trigger, TriggerType,
};
pub use request::{
    Application, ConnectionsStatus, Device, Intent, Permissions, PlatformContext,
    RequestEnvelope, Session, SessionEndedError, SkillRequest, Slot, SystemState, User,
};
pub use response::{
    Card, Directive, OutputSpeech, RESPONSE_FORMAT_VERSION, Reprompt, Response, ResponseEnvelope,
};
