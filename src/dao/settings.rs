use std::sync::Arc;

use tracing::warn;

use crate::dao::storage::SlotStore;

/// Slot holding the chat webhook URL.
pub const WEBHOOK_SLOT: &str = "slack_webhook_url";
/// Slot holding the latency compensation in milliseconds.
pub const LATENCY_SLOT: &str = "latency_compensation";

/// Persisted settings slots. Failures are logged and read back as "not set".
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn SlotStore>,
}

impl SettingsRepository {
    /// Wrap a slot store.
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Stored webhook URL, if any.
    pub async fn webhook_url(&self) -> Option<String> {
        match self.store.read(WEBHOOK_SLOT).await {
            Ok(value) => value.filter(|url| !url.is_empty()),
            Err(err) => {
                warn!(error = %err, "failed to get webhook from storage");
                None
            }
        }
    }

    /// Persist the webhook URL.
    pub async fn save_webhook_url(&self, url: &str) {
        if let Err(err) = self.store.write(WEBHOOK_SLOT, url.to_string()).await {
            warn!(error = %err, "failed to save webhook to storage");
        }
    }

    /// Forget the webhook URL.
    pub async fn clear_webhook_url(&self) {
        if let Err(err) = self.store.remove(WEBHOOK_SLOT).await {
            warn!(error = %err, "failed to clear webhook from storage");
        }
    }

    /// Stored latency compensation, `None` when missing or not a number.
    pub async fn latency_compensation(&self) -> Option<f64> {
        let raw = match self.store.read(LATENCY_SLOT).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "failed to get latency compensation from storage");
                return None;
            }
        };

        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                warn!(value = %raw, "ignoring malformed latency compensation in storage");
                None
            }
        }
    }

    /// Persist the latency compensation.
    pub async fn save_latency_compensation(&self, value: f64) {
        if let Err(err) = self.store.write(LATENCY_SLOT, value.to_string()).await {
            warn!(error = %err, "failed to save latency compensation to storage");
        }
    }
}
