/// Deviation to points table.
pub mod scoring;
/// In-memory settings.
pub mod settings;
mod sse;
/// Round state machine.
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    dao::{
        models::StoredRound, rounds::RoundsRepository, settings::SettingsRepository,
        storage::SlotStore,
    },
    services::{notifier::Notifier, sse_events},
};

pub use self::sse::SseHub;
use self::{
    settings::Settings,
    state_machine::{Dispatch, RoundEvent, RoundPhase, RoundStateMachine, Snapshot},
};

/// Cheaply clonable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Result of applying one event to the shared machine.
#[derive(Debug, Clone)]
pub struct AppliedEvent {
    /// What the machine did with the event.
    pub dispatch: Dispatch,
    /// State right after the event.
    pub snapshot: Snapshot,
    /// Round record when the event resolved the round.
    pub finished: Option<StoredRound>,
}

/// Central application state: the round machine, settings and storage handles.
pub struct AppState {
    config: AppConfig,
    game: RwLock<RoundStateMachine>,
    settings: RwLock<Settings>,
    rounds: RoundsRepository,
    settings_store: SettingsRepository,
    sse: SseHub,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The machine starts in [`RoundPhase::LoadingGame`] with the latency of `settings`.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn SlotStore>,
        settings: Settings,
        notifier: Arc<dyn Notifier>,
    ) -> SharedState {
        let game = RoundStateMachine::new(
            settings.latency_compensation,
            config.thresholds().clone(),
        );
        Arc::new(Self {
            config,
            game: RwLock::new(game),
            settings: RwLock::new(settings),
            rounds: RoundsRepository::new(store.clone()),
            settings_store: SettingsRepository::new(store),
            sse: SseHub::new(16),
            notifier,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Finished rounds history.
    pub fn rounds(&self) -> &RoundsRepository {
        &self.rounds
    }

    /// Persisted settings slots.
    pub fn settings_store(&self) -> &SettingsRepository {
        &self.settings_store
    }

    /// In-memory settings.
    pub fn settings(&self) -> &RwLock<Settings> {
        &self.settings
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Sender used for round summaries.
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    /// Snapshot the shared machine.
    pub async fn snapshot(&self) -> Snapshot {
        self.game.read().await.snapshot()
    }

    /// Apply one event to the shared machine.
    pub async fn apply_event(&self, event: RoundEvent) -> AppliedEvent {
        let mut sm = self.game.write().await;
        self.apply_locked(&mut sm, event)
    }

    /// Apply `event` only if `condition` holds for the current state, checked under the same lock.
    pub async fn apply_event_if<F>(&self, event: RoundEvent, condition: F) -> Option<AppliedEvent>
    where
        F: FnOnce(&Snapshot) -> bool,
    {
        let mut sm = self.game.write().await;
        if !condition(&sm.snapshot()) {
            return None;
        }
        Some(self.apply_locked(&mut sm, event))
    }

    /// Send `event` and publish the resulting snapshot while the write lock is still held,
    /// so subscribers see snapshots in version order.
    fn apply_locked(&self, sm: &mut RoundStateMachine, event: RoundEvent) -> AppliedEvent {
        let dispatch = sm.send(event);
        let finished = match dispatch {
            Dispatch::Transitioned {
                to: RoundPhase::RoundFinished,
                ..
            } => sm.finished_round(),
            _ => None,
        };
        let snapshot = sm.snapshot();

        if !matches!(dispatch, Dispatch::Ignored(_)) {
            if let Some(event) = sse_events::round_snapshot_event(&snapshot) {
                self.sse.broadcast(event);
            }
        }

        AppliedEvent {
            dispatch,
            snapshot,
            finished,
        }
    }
}
