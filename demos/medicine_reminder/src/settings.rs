//! Skill settings read from the `[skill]` configuration section.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};
use time_tz::{OffsetDateTimeExt, Tz, timezones};

use parley::alexa::model::{
    AlertInfo, PushNotification, PushNotificationStatus, Recurrence, ReminderRequest, SpokenInfo,
    SpokenText, Trigger, TriggerType,
};

/// Permission scope needed to manage the user's reminders.
pub const REMINDER_PERMISSION_SCOPE: &str = "alexa::alerts:reminders:skill:readwrite";

/// Errors in the skill's own settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("reminder offset of {0} minutes is out of range")]
    OffsetOutOfRange(i64),

    #[error("failed to format reminder time: {0}")]
    Format(#[from] time::error::Format),
}

/// Settings for the medicine reminder skill.
///
/// ```toml
/// [skill]
/// time_zone = "America/Los_Angeles"
/// offset_minutes = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSettings {
    /// IANA zone the reminder is scheduled in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Minutes from now until the first reminder fires.
    #[serde(default = "default_offset_minutes")]
    pub offset_minutes: i64,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_permission_scope")]
    pub permission_scope: String,

    /// RFC 5545 rules for the recurring reminder.
    #[serde(default = "default_recurrence_rules")]
    pub recurrence_rules: Vec<String>,

    #[serde(default = "default_reminder_ssml")]
    pub reminder_ssml: String,

    #[serde(default = "default_reminder_text")]
    pub reminder_text: String,

    /// Timeout for calls to the reminder API, in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            offset_minutes: default_offset_minutes(),
            locale: default_locale(),
            permission_scope: default_permission_scope(),
            recurrence_rules: default_recurrence_rules(),
            reminder_ssml: default_reminder_ssml(),
            reminder_text: default_reminder_text(),
            api_timeout_secs: default_api_timeout_secs(),
        }
    }
}

impl SkillSettings {
    /// Resolves the configured time zone.
    pub fn tz(&self) -> Result<&'static Tz, SettingsError> {
        timezones::get_by_name(&self.time_zone)
            .ok_or_else(|| SettingsError::UnknownTimeZone(self.time_zone.clone()))
    }

    /// Checks the settings that can only fail at request time.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.tz()?;
        self.offset()?;
        Ok(())
    }

    /// The delay before the first reminder; must be non-negative and small
    /// enough to add to the current time.
    fn offset(&self) -> Result<Duration, SettingsError> {
        const MAX_OFFSET_MINUTES: i64 = 366 * 24 * 60;

        if !(0..=MAX_OFFSET_MINUTES).contains(&self.offset_minutes) {
            return Err(SettingsError::OffsetOutOfRange(self.offset_minutes));
        }
        Ok(Duration::minutes(self.offset_minutes))
    }

    /// Local wall-clock time of the first reminder, `YYYY-MM-DDTHH:MM:SS`.
    pub fn scheduled_time(&self, now: OffsetDateTime) -> Result<String, SettingsError> {
        let at = now
            .checked_add(self.offset()?)
            .ok_or(SettingsError::OffsetOutOfRange(self.offset_minutes))?;
        let local = at.to_timezone(self.tz()?);
        let formatted =
            local.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))?;
        Ok(formatted)
    }

    /// Builds the recurring reminder scheduled relative to `now`.
    pub fn reminder_request(&self, now: OffsetDateTime) -> Result<ReminderRequest, SettingsError> {
        let scheduled_time = self.scheduled_time(now)?;

        Ok(ReminderRequest {
            request_time: scheduled_time.clone(),
            trigger: Trigger {
                trigger_type: TriggerType::ScheduledAbsolute,
                scheduled_time: Some(scheduled_time),
                offset_in_seconds: None,
                time_zone_id: Some(self.time_zone.clone()),
                recurrence: Some(Recurrence {
                    recurrence_rules: self.recurrence_rules.clone(),
                }),
            },
            alert_info: AlertInfo {
                spoken_info: SpokenInfo {
                    content: vec![SpokenText {
                        locale: self.locale.clone(),
                        ssml: Some(self.reminder_ssml.clone()),
                        text: Some(self.reminder_text.clone()),
                    }],
                },
            },
            push_notification: PushNotification {
                status: PushNotificationStatus::Enabled,
            },
        })
    }
}

fn default_time_zone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_offset_minutes() -> i64 {
    5
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_permission_scope() -> String {
    REMINDER_PERMISSION_SCOPE.to_string()
}

fn default_recurrence_rules() -> Vec<String> {
    vec![
        "FREQ=DAILY;BYHOUR=6;BYMINUTE=10;BYSECOND=0;INTERVAL=1;".to_string(),
        "FREQ=DAILY;BYHOUR=17;BYMINUTE=15;BYSECOND=0;INTERVAL=1;".to_string(),
        "FREQ=DAILY;BYHOUR=19;BYMINUTE=45;BYSECOND=0;INTERVAL=1;".to_string(),
    ]
}

fn default_reminder_ssml() -> String {
    "<speak> Great! I have scheduled reminder for you.</speak>".to_string()
}

fn default_reminder_text() -> String {
    "This is medicine reminder. Please take your medicine".to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}
