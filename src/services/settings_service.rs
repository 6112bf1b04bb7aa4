//! Settings provider: persisted latency and webhook, in-memory notification switch.

use tracing::info;

use crate::{
    dao::settings::SettingsRepository,
    dto::settings::{LatencyInput, SettingsResponse},
    error::ServiceError,
    services::game_service,
    state::{SharedState, settings::Settings, state_machine::RoundEvent},
};

/// Read persisted settings, keeping `default_latency` when none was saved.
pub async fn load_persisted(repository: &SettingsRepository, default_latency: f64) -> Settings {
    let mut settings = Settings::with_latency(default_latency);
    if let Some(url) = repository.webhook_url().await {
        settings.slack_webhook_url = Some(url);
    }
    if let Some(latency) = repository.latency_compensation().await {
        settings.latency_compensation = latency.max(0.0);
    }
    settings
}

/// Current settings.
pub async fn get_settings(state: &SharedState) -> SettingsResponse {
    state.settings().read().await.clone().into()
}

/// Persist a new latency compensation and hand it to the round machine.
pub async fn save_latency_compensation(
    state: &SharedState,
    input: LatencyInput,
) -> SettingsResponse {
    let value = coerce_latency(&input);
    state.settings_store().save_latency_compensation(value).await;
    state.settings().write().await.latency_compensation = value;
    info!(latency_compensation = value, "latency compensation saved");

    game_service::apply(state, RoundEvent::LatencyChanged(value)).await;
    get_settings(state).await
}

/// Persist the webhook URL; blank input is rejected.
pub async fn save_webhook(state: &SharedState, url: &str) -> Result<SettingsResponse, ServiceError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(
            "webhook url must not be empty".into(),
        ));
    }

    state.settings_store().save_webhook_url(trimmed).await;
    state.settings().write().await.slack_webhook_url = Some(trimmed.to_string());
    info!("webhook saved");
    Ok(get_settings(state).await)
}

/// Forget the webhook URL.
pub async fn clear_webhook(state: &SharedState) -> SettingsResponse {
    state.settings_store().clear_webhook_url().await;
    state.settings().write().await.slack_webhook_url = None;
    info!("webhook cleared");
    get_settings(state).await
}

/// Set the in-memory notification switch.
pub async fn set_suspend_notifications(state: &SharedState, suspended: bool) -> SettingsResponse {
    state.settings().write().await.suspend_notifications = suspended;
    get_settings(state).await
}

/// Flip the in-memory notification switch.
pub async fn toggle_suspend_notifications(state: &SharedState) -> SettingsResponse {
    {
        let mut settings = state.settings().write().await;
        settings.suspend_notifications = !settings.suspend_notifications;
    }
    get_settings(state).await
}

/// Turn form input into a latency the round machine can use: a finite number, at least zero.
pub fn coerce_latency(input: &LatencyInput) -> f64 {
    let value = match input {
        LatencyInput::Number(value) => *value,
        LatencyInput::Text(text) if text.trim().is_empty() => 0.0,
        LatencyInput::Text(text) => text.trim().parse().unwrap_or(0.0),
    };

    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::{self, BoxFuture};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::StoredRound, slot_store::MemorySlotStore},
        services::notifier::{Notifier, NotifyError},
        state::AppState,
    };

    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn notify(
            &self,
            _webhook_url: String,
            _round: StoredRound,
        ) -> BoxFuture<'static, Result<(), NotifyError>> {
            Box::pin(future::ready(Ok(())))
        }
    }

    fn test_state(store: MemorySlotStore) -> SharedState {
        AppState::new(
            AppConfig::default(),
            Arc::new(store),
            Settings::with_latency(250.0),
            Arc::new(SilentNotifier),
        )
    }

    #[test]
    fn latency_input_is_coerced_to_a_non_negative_number() {
        assert_eq!(coerce_latency(&LatencyInput::Number(120.0)), 120.0);
        assert_eq!(coerce_latency(&LatencyInput::Number(-5.0)), 0.0);
        assert_eq!(coerce_latency(&LatencyInput::Text(" 80 ".into())), 80.0);
        assert_eq!(coerce_latency(&LatencyInput::Text("fast".into())), 0.0);
        assert_eq!(coerce_latency(&LatencyInput::Text("".into())), 0.0);
        assert_eq!(coerce_latency(&LatencyInput::Text("inf".into())), 0.0);
    }

    #[tokio::test]
    async fn persisted_settings_are_loaded() {
        let store = MemorySlotStore::new();
        let repository = SettingsRepository::new(Arc::new(store.clone()));
        assert_eq!(
            load_persisted(&repository, 250.0).await,
            Settings::with_latency(250.0)
        );

        repository.save_latency_compensation(90.0).await;
        repository.save_webhook_url("https://hooks.example.com/x").await;
        let settings = load_persisted(&repository, 250.0).await;
        assert_eq!(settings.latency_compensation, 90.0);
        assert_eq!(
            settings.slack_webhook_url.as_deref(),
            Some("https://hooks.example.com/x")
        );
        assert!(!settings.suspend_notifications);
    }

    #[tokio::test]
    async fn saved_latency_reaches_the_round_machine_and_storage() {
        let store = MemorySlotStore::new();
        let state = test_state(store.clone());

        let response = save_latency_compensation(&state, LatencyInput::Number(75.0)).await;
        assert_eq!(response.latency_compensation, 75.0);
        assert_eq!(state.snapshot().await.context.latency_compensation, 75.0);

        let repository = SettingsRepository::new(Arc::new(store));
        assert_eq!(repository.latency_compensation().await, Some(75.0));
    }

    #[tokio::test]
    async fn webhook_is_trimmed_and_blank_is_rejected() {
        let state = test_state(MemorySlotStore::new());

        let response = save_webhook(&state, "  https://hooks.example.com/x \n")
            .await
            .unwrap();
        assert_eq!(
            response.slack_webhook_url.as_deref(),
            Some("https://hooks.example.com/x")
        );

        assert!(matches!(
            save_webhook(&state, "   ").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(get_settings(&state).await.slack_webhook_url.is_some());

        assert!(clear_webhook(&state).await.slack_webhook_url.is_none());
        assert_eq!(state.settings_store().webhook_url().await, None);
    }

    #[tokio::test]
    async fn suspension_toggles_without_persisting() {
        let store = MemorySlotStore::new();
        let state = test_state(store.clone());

        assert!(toggle_suspend_notifications(&state).await.suspend_notifications);
        assert!(!toggle_suspend_notifications(&state).await.suspend_notifications);
        assert!(set_suspend_notifications(&state, true).await.suspend_notifications);

        let repository = SettingsRepository::new(Arc::new(store));
        let reloaded = load_persisted(&repository, 250.0).await;
        assert!(!reloaded.suspend_notifications);
    }
}
