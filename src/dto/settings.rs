use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::settings::Settings;

/// Current settings.
#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    /// Milliseconds added to the ideal hit instant.
    pub latency_compensation: f64,
    /// Configured chat webhook, if any.
    pub slack_webhook_url: Option<String>,
    /// Whether round summaries are currently withheld.
    pub suspend_notifications: bool,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self {
            latency_compensation: settings.latency_compensation,
            slack_webhook_url: settings.slack_webhook_url,
            suspend_notifications: settings.suspend_notifications,
        }
    }
}

/// Latency as typed in a settings form: a number or its text.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LatencyInput {
    /// Milliseconds as a JSON number.
    Number(f64),
    /// Milliseconds as typed in a text field.
    Text(String),
}

/// Payload updating the latency compensation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLatencyRequest {
    /// New latency compensation in milliseconds.
    pub latency_compensation: LatencyInput,
}

/// Payload saving the chat webhook.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateWebhookRequest {
    /// Incoming webhook URL; surrounding whitespace is trimmed.
    #[validate(length(max = 2048))]
    pub url: String,
}

/// Payload setting the notification suspension flag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SuspendNotificationsRequest {
    /// Whether round summaries should be withheld.
    pub suspended: bool,
}
