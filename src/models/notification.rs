use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PushToken {
    pub id: i64,
    pub role: Role,
    pub client_id: Option<i64>,
    pub expo_push_token: String,
    pub device_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    pub id: i64,
    pub role: Role,
    pub client_id: Option<i64>,
    pub session_reminders: bool,
    pub workout_logged: bool,
    pub measurement_recorded: bool,
    pub reminder_minutes_before: i32,
    pub updated_at: DateTime<Utc>,
}

/// Preference values returned when a recipient has no stored row.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceDefaults {
    pub session_reminders: bool,
    pub workout_logged: bool,
    pub measurement_recorded: bool,
    pub reminder_minutes_before: i32,
}

impl Default for PreferenceDefaults {
    fn default() -> Self {
        Self {
            session_reminders: true,
            workout_logged: true,
            measurement_recorded: true,
            reminder_minutes_before: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_preferences_default_to_all_enabled() {
        let defaults = PreferenceDefaults::default();
        assert!(defaults.session_reminders);
        assert!(defaults.workout_logged);
        assert!(defaults.measurement_recorded);
        assert_eq!(defaults.reminder_minutes_before, 60);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Trainer).unwrap(), "\"trainer\"");
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
    }
}
