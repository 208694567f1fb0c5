//! Reminder management API types.

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/alerts/reminders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    /// Local time at which the request was made, `YYYY-MM-DDThh:mm:ss`.
    pub request_time: String,
    pub trigger: Trigger,
    pub alert_info: AlertInfo,
    pub push_notification: PushNotification,
}

/// When the reminder fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Local fire time for absolute triggers, `YYYY-MM-DDThh:mm:ss`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    /// Delay for relative triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_in_seconds: Option<u64>,
    /// IANA time zone in which `scheduled_time` is interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    ScheduledAbsolute,
    ScheduledRelative,
}

/// RFC 5545 recurrence rules, e.g. `FREQ=DAILY;BYHOUR=6;BYMINUTE=10;...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub recurrence_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertInfo {
    pub spoken_info: SpokenInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenInfo {
    pub content: Vec<SpokenText>,
}

/// What the device says when the reminder fires, per locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenText {
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    pub status: PushNotificationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushNotificationStatus {
    Enabled,
    Disabled,
}

/// Response of a successful reminder creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    #[serde(default)]
    pub alert_token: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absolute_trigger_wire_format() {
        let request = ReminderRequest {
            request_time: "2024-05-01T10:05:00".into(),
            trigger: Trigger {
                trigger_type: TriggerType::ScheduledAbsolute,
                scheduled_time: Some("2024-05-01T10:05:00".into()),
                offset_in_seconds: None,
                time_zone_id: Some("America/Los_Angeles".into()),
                recurrence: Some(Recurrence {
                    recurrence_rules: vec![
                        "FREQ=DAILY;BYHOUR=6;BYMINUTE=10;BYSECOND=0;INTERVAL=1;".into(),
                    ],
                }),
            },
            alert_info: AlertInfo {
                spoken_info: SpokenInfo {
                    content: vec![SpokenText {
                        locale: "en-US".into(),
                        ssml: None,
                        text: Some("take your medicine".into()),
                    }],
                },
            },
            push_notification: PushNotification {
                status: PushNotificationStatus::Enabled,
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "requestTime": "2024-05-01T10:05:00",
                "trigger": {
                    "type": "SCHEDULED_ABSOLUTE",
                    "scheduledTime": "2024-05-01T10:05:00",
                    "timeZoneId": "America/Los_Angeles",
                    "recurrence": {
                        "recurrenceRules": ["FREQ=DAILY;BYHOUR=6;BYMINUTE=10;BYSECOND=0;INTERVAL=1;"]
                    }
                },
                "alertInfo": {
                    "spokenInfo": {
                        "content": [{ "locale": "en-US", "text": "take your medicine" }]
                    }
                },
                "pushNotification": { "status": "ENABLED" }
            })
        );
    }

    #[test]
    fn test_reminder_response_tolerates_missing_fields() {
        let response: ReminderResponse =
            serde_json::from_value(json!({ "alertToken": "a-1", "status": "ON" })).unwrap();
        assert_eq!(response.alert_token.as_deref(), Some("a-1"));
        assert_eq!(response.href, None);
    }
}
