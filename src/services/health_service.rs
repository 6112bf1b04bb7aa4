use crate::{
    dto::health::HealthResponse,
    state::{SharedState, state_machine::RoundPhase},
};

/// Report whether the game finished bootstrapping, with its current phase.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let snapshot = state.snapshot().await;
    match snapshot.phase {
        RoundPhase::LoadingGame => HealthResponse::loading(),
        phase => HealthResponse::ok((&phase).into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::slot_store::MemorySlotStore,
        dto::phase::VisibleRoundPhase,
        services::{game_service, notifier::SlackNotifier},
        state::{AppState, settings::Settings},
    };

    #[tokio::test]
    async fn reports_loading_until_bootstrapped() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemorySlotStore::new()),
            Settings::with_latency(250.0),
            Arc::new(SlackNotifier::new()),
        );
        assert_eq!(health_status(&state).await.status, "loading");

        game_service::bootstrap(&state).await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.phase, VisibleRoundPhase::TeamSetup);
    }
}
