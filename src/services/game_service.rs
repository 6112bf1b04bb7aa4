//! Host around the round machine: commands, persistence of finished rounds,
//! notifications and the round timeout timer.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    dao::models::StoredRound,
    dto::{
        game::RoundSnapshot,
        rounds::{RoundOrder, RoundSummary},
    },
    error::ServiceError,
    services::sse_events,
    state::{
        AppliedEvent, SharedState,
        state_machine::{Dispatch, RoundEvent, RoundPhase},
    },
};

/// Leave the loading phase once settings and storage are ready.
pub async fn bootstrap(state: &SharedState) -> RoundSnapshot {
    let applied = apply(state, RoundEvent::GameLoaded).await;
    info!(phase = ?applied.snapshot.phase, "game loaded");
    RoundSnapshot::from(&applied.snapshot)
}

/// Current state of the round machine.
pub async fn snapshot(state: &SharedState) -> RoundSnapshot {
    RoundSnapshot::from(&state.snapshot().await)
}

/// Replace the team name. Accepted in every phase.
pub async fn update_team_name(state: &SharedState, name: String) -> RoundSnapshot {
    let applied = apply(state, RoundEvent::TeamNameChanged(name)).await;
    RoundSnapshot::from(&applied.snapshot)
}

/// Start the round for the current team and arm the timeout timer.
pub async fn start_round(state: &SharedState) -> Result<RoundSnapshot, ServiceError> {
    command(state, RoundEvent::StartRound).await
}

/// Resolve the round with the team's hit.
pub async fn complete_round(
    state: &SharedState,
    seconds_in: f64,
) -> Result<RoundSnapshot, ServiceError> {
    debug!(seconds_in, "round completed");
    command(state, RoundEvent::RoundCompleted { seconds_in }).await
}

/// Resolve the round as timed out without waiting for the timer.
pub async fn time_out_round(state: &SharedState) -> Result<RoundSnapshot, ServiceError> {
    command(state, RoundEvent::RoundTimedOut).await
}

/// Go back to team setup after a finished round.
pub async fn reset_game(state: &SharedState) -> Result<RoundSnapshot, ServiceError> {
    command(state, RoundEvent::ResetGame).await
}

/// Finished rounds, in history or leaderboard order.
pub async fn list_rounds(state: &SharedState, order: RoundOrder) -> Vec<RoundSummary> {
    let mut rounds = state.rounds().load_rounds().await;
    if order == RoundOrder::Score {
        rounds.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.ms_off.total_cmp(&b.ms_off))
        });
    }
    rounds.into_iter().map(RoundSummary::from).collect()
}

/// Drop the whole rounds history.
pub async fn clear_rounds(state: &SharedState) {
    state.rounds().clear_rounds().await;
    info!("rounds history cleared");
    sse_events::broadcast_rounds_updated(state, Vec::new());
}

/// Apply an event and run what the host owes to its outcome.
pub(crate) async fn apply(state: &SharedState, event: RoundEvent) -> AppliedEvent {
    let applied = state.apply_event(event).await;
    handle_applied(state, &applied).await;
    applied
}

/// Apply an explicit command; an event the current phase does not accept is a conflict.
async fn command(state: &SharedState, event: RoundEvent) -> Result<RoundSnapshot, ServiceError> {
    let applied = apply(state, event).await;
    match applied.dispatch {
        Dispatch::Ignored(invalid) => {
            debug!(error = %invalid, "command ignored by the round machine");
            Err(invalid.into())
        }
        _ => Ok(RoundSnapshot::from(&applied.snapshot)),
    }
}

async fn handle_applied(state: &SharedState, applied: &AppliedEvent) {
    if matches!(applied.dispatch, Dispatch::Ignored(_)) {
        return;
    }

    if let Dispatch::Transitioned {
        to: RoundPhase::RoundPlaying,
        ..
    } = applied.dispatch
    {
        if let Some(played_at) = applied.snapshot.context.game_played_at {
            info!(team = %applied.snapshot.context.team_name, played_at, "round started");
            arm_round_timer(state, played_at);
        }
    }

    if let Some(round) = &applied.finished {
        record_finished_round(state, round.clone()).await;
    }
}

async fn record_finished_round(state: &SharedState, round: StoredRound) {
    info!(
        team = %round.team_name,
        score = round.score,
        ms_off = round.ms_off,
        "round finished"
    );

    let rounds = state.rounds().add_round(round.clone()).await;
    sse_events::broadcast_rounds_updated(state, rounds);
    spawn_notification(state, round).await;
}

/// Hand the round to the notifier without waiting for the delivery.
async fn spawn_notification(state: &SharedState, round: StoredRound) {
    let settings = state.settings().read().await.clone();
    if settings.suspend_notifications {
        info!("notifications suspended, skipping webhook post");
        return;
    }
    let Some(webhook_url) = settings.slack_webhook_url else {
        info!("no webhook configured, skipping webhook post");
        return;
    };

    let notifier = state.notifier();
    tokio::spawn(async move {
        if let Err(err) = notifier.notify(webhook_url, round).await {
            warn!(error = %err, "failed to post score to webhook");
        }
    });
}

fn arm_round_timer(state: &SharedState, played_at: u64) {
    let state = state.clone();
    let limit = state.config().round_timeout();
    tokio::spawn(async move {
        sleep(limit).await;
        expire_round(&state, played_at).await;
    });
}

/// Time out the round started at `played_at`, if it is still the one being played.
async fn expire_round(state: &SharedState, played_at: u64) {
    let applied = state
        .apply_event_if(RoundEvent::RoundTimedOut, |snapshot| {
            snapshot.phase == RoundPhase::RoundPlaying
                && snapshot.context.game_played_at == Some(played_at)
        })
        .await;

    match applied {
        Some(applied) => {
            info!(played_at, "round timed out");
            handle_applied(state, &applied).await;
        }
        None => debug!(played_at, "round timer expired after the round ended"),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use futures::future::{self, BoxFuture};
    use tokio::{sync::mpsc, time::timeout};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::slot_store::MemorySlotStore,
        dto::phase::VisibleRoundPhase,
        services::{
            notifier::{Notifier, NotifyError},
            settings_service,
        },
        state::{AppState, settings::Settings},
    };

    const WEBHOOK: &str = "https://hooks.example.com/services/T/B/x";

    struct RecordingNotifier {
        tx: mpsc::UnboundedSender<(String, StoredRound)>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(
            &self,
            webhook_url: String,
            round: StoredRound,
        ) -> BoxFuture<'static, Result<(), NotifyError>> {
            let _ = self.tx.send((webhook_url, round));
            Box::pin(future::ready(Ok(())))
        }
    }

    fn test_state(
        round_timeout: Duration,
    ) -> (SharedState, mpsc::UnboundedReceiver<(String, StoredRound)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState::new(
            AppConfig::default().with_round_timeout(round_timeout),
            Arc::new(MemorySlotStore::new()),
            Settings::with_latency(250.0),
            Arc::new(RecordingNotifier { tx }),
        );
        (state, rx)
    }

    async fn ready_state(
        team: &str,
    ) -> (SharedState, mpsc::UnboundedReceiver<(String, StoredRound)>) {
        let (state, rx) = test_state(Duration::from_secs(60));
        bootstrap(&state).await;
        update_team_name(&state, team.into()).await;
        (state, rx)
    }

    #[tokio::test]
    async fn bootstrap_leaves_loading_phase() {
        let (state, _rx) = test_state(Duration::from_secs(60));
        assert_eq!(snapshot(&state).await.phase, VisibleRoundPhase::Loading);

        let snap = bootstrap(&state).await;
        assert_eq!(snap.phase, VisibleRoundPhase::TeamSetup);
    }

    #[tokio::test]
    async fn finished_round_is_stored_and_posted() {
        let (state, mut rx) = ready_state("Divas").await;
        settings_service::save_webhook(&state, WEBHOOK).await.unwrap();

        start_round(&state).await.unwrap();
        let snap = complete_round(&state, 21.0).await.unwrap();
        assert_eq!(snap.phase, VisibleRoundPhase::Finished);
        assert_eq!(snap.ms_off, Some(1750.0));
        assert_eq!(snap.score, Some(2));

        let rounds = list_rounds(&state, RoundOrder::Recorded).await;
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].team_name, "Divas");
        assert_eq!(Some(rounds[0].id), snap.game_played_at);

        let (url, posted) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(url, WEBHOOK);
        assert_eq!(posted.score, 2);
    }

    #[tokio::test]
    async fn suspended_notifications_still_store_the_round() {
        let (state, mut rx) = ready_state("Divas").await;
        settings_service::save_webhook(&state, WEBHOOK).await.unwrap();
        settings_service::set_suspend_notifications(&state, true).await;

        start_round(&state).await.unwrap();
        complete_round(&state, 19.25).await.unwrap();

        assert_eq!(list_rounds(&state, RoundOrder::Recorded).await.len(), 1);
        assert!(
            timeout(Duration::from_millis(100), rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn missing_webhook_skips_notification() {
        let (state, mut rx) = ready_state("Divas").await;
        start_round(&state).await.unwrap();
        time_out_round(&state).await.unwrap();

        assert!(
            timeout(Duration::from_millis(100), rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn commands_out_of_phase_are_conflicts() {
        let (state, _rx) = test_state(Duration::from_secs(60));
        bootstrap(&state).await;
        update_team_name(&state, "Ali".into()).await;

        match start_round(&state).await {
            Err(ServiceError::RoundRejected(invalid)) => {
                assert_eq!(invalid.from, RoundPhase::SettingUpTeam);
                assert_eq!(invalid.event, RoundEvent::StartRound);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(
            reset_game(&state).await,
            Err(ServiceError::RoundRejected(_))
        ));
        assert!(list_rounds(&state, RoundOrder::Recorded).await.is_empty());
    }

    #[tokio::test]
    async fn timer_times_out_a_forgotten_round() {
        let (state, _rx) = test_state(Duration::from_millis(30));
        bootstrap(&state).await;
        update_team_name(&state, "Divas".into()).await;
        start_round(&state).await.unwrap();

        sleep(Duration::from_millis(300)).await;

        let snap = snapshot(&state).await;
        assert_eq!(snap.phase, VisibleRoundPhase::Finished);
        assert!(snap.timed_out);
        assert_eq!(snap.score, Some(0));
        assert_eq!(snap.ms_off, None);

        let rounds = list_rounds(&state, RoundOrder::Recorded).await;
        assert_eq!(rounds.len(), 1);
        assert!(rounds[0].timed_out);
    }

    #[tokio::test]
    async fn stale_timer_leaves_the_next_round_alone() {
        let (state, _rx) = ready_state("Divas").await;
        let first = start_round(&state).await.unwrap();
        complete_round(&state, 19.0).await.unwrap();
        reset_game(&state).await.unwrap();
        update_team_name(&state, "Bodyguards".into()).await;
        let second = start_round(&state).await.unwrap();

        let stale = first.game_played_at.unwrap().saturating_sub(1);
        expire_round(&state, stale).await;
        assert_eq!(snapshot(&state).await.phase, VisibleRoundPhase::Playing);

        expire_round(&state, second.game_played_at.unwrap()).await;
        let snap = snapshot(&state).await;
        assert_eq!(snap.phase, VisibleRoundPhase::Finished);
        assert!(snap.timed_out);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_score_then_accuracy() {
        let (state, _rx) = test_state(Duration::from_secs(60));
        for (team, score, ms_off, at) in [
            ("Divas", 5, 900.0, 1),
            ("Bodyguards", 10, 250.0, 2),
            ("Greatest", 10, 40.0, 3),
            ("Timeouts", 0, f64::INFINITY, 4),
        ] {
            state
                .rounds()
                .add_round(StoredRound::new(team.into(), score, ms_off, at))
                .await;
        }

        let board: Vec<_> = list_rounds(&state, RoundOrder::Score)
            .await
            .into_iter()
            .map(|round| round.team_name)
            .collect();
        assert_eq!(board, ["Greatest", "Bodyguards", "Divas", "Timeouts"]);

        let history = list_rounds(&state, RoundOrder::Recorded).await;
        assert_eq!(history[0].team_name, "Divas");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn snapshots_reach_subscribers_in_version_order() {
        let (state, _rx) = test_state(Duration::from_secs(60));
        bootstrap(&state).await;
        let mut receiver = state.public_sse().subscribe();

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let state = state.clone();
                tokio::spawn(async move { update_team_name(&state, format!("Team {i}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut versions = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if event.event.as_deref() == Some("round.snapshot") {
                let data: serde_json::Value = serde_json::from_str(&event.data).unwrap();
                versions.push(data["version"].as_u64().unwrap());
            }
        }

        assert_eq!(versions.len(), 10);
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn clearing_rounds_is_idempotent() {
        let (state, _rx) = ready_state("Divas").await;
        start_round(&state).await.unwrap();
        time_out_round(&state).await.unwrap();

        clear_rounds(&state).await;
        clear_rounds(&state).await;
        assert!(list_rounds(&state, RoundOrder::Recorded).await.is_empty());
    }
}
