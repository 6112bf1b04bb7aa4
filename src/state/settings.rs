/// Runtime view of the settings shared by the host services.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Milliseconds added to the ideal hit instant (persisted).
    pub latency_compensation: f64,
    /// Chat webhook receiving round summaries (persisted).
    pub slack_webhook_url: Option<String>,
    /// Skip notifications without forgetting the webhook (memory only).
    pub suspend_notifications: bool,
}

impl Settings {
    /// Settings before anything was loaded from storage.
    pub fn with_latency(latency_compensation: f64) -> Self {
        Self {
            latency_compensation,
            slack_webhook_url: None,
            suspend_notifications: false,
        }
    }
}
