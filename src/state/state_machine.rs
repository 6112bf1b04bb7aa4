use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::{dao::models::StoredRound, state::scoring::ThresholdTable};

/// Offset from the round start where teams should hit, in milliseconds.
pub const IDEAL_HIT_MS: f64 = 19_000.0;
/// Latency compensation used when no setting has been persisted yet.
pub const DEFAULT_LATENCY_COMPENSATION_MS: f64 = 250.0;
/// A team name must be strictly longer than this to start a round.
const MIN_TEAM_NAME_LEN: usize = 3;

/// Phases a single game goes through, round after round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Host is still bootstrapping (settings, storage).
    LoadingGame,
    /// The team name is being typed and is not long enough yet.
    SettingUpTeam,
    /// The team name is valid; the round can be started.
    ReadyToStart,
    /// The song is running and the team is waiting for the hit.
    RoundPlaying,
    /// Score and deviation are resolved for the round.
    RoundFinished,
}

/// Events that can be sent to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    /// Host finished bootstrapping.
    GameLoaded,
    /// Team name was edited (accepted in every phase).
    TeamNameChanged(String),
    /// Latency compensation setting changed (accepted in every phase).
    LatencyChanged(f64),
    /// Start the song for the current team.
    StartRound,
    /// The host timer expired before the team hit.
    RoundTimedOut,
    /// The team hit, `seconds_in` seconds after the round start.
    RoundCompleted {
        /// Elapsed seconds between the start of the song and the hit.
        seconds_in: f64,
    },
    /// Clear the finished round and go back to team setup.
    ResetGame,
}

/// Context mutated by transitions; owned by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundContext {
    /// Free-text name of the playing team.
    pub team_name: String,
    /// Milliseconds added to the ideal hit instant before computing the deviation.
    pub latency_compensation: f64,
    /// Epoch milliseconds of the round start, stamped when entering [`RoundPhase::RoundPlaying`].
    pub game_played_at: Option<u64>,
    /// Absolute deviation from the ideal hit, infinite when the round timed out.
    pub ms_off: Option<f64>,
    /// Points earned for the round.
    pub score: Option<u32>,
}

impl RoundContext {
    fn new(latency_compensation: f64) -> Self {
        Self {
            team_name: String::new(),
            latency_compensation,
            game_played_at: None,
            ms_off: None,
            score: None,
        }
    }

    /// Whether the team name is long enough to leave team setup.
    pub fn has_valid_team_name(&self) -> bool {
        self.team_name.chars().count() > MIN_TEAM_NAME_LEN
    }
}

/// Context change attached to a transition of the table.
#[derive(Debug, Clone, PartialEq)]
enum ContextUpdate {
    Keep,
    TeamName(String),
    Latency(f64),
    StampPlayedAt,
    Resolve { ms_off: f64, score: u32 },
    Reset,
}

/// Event received in a phase that has no transition for it. The machine is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the event was received.
    pub from: RoundPhase,
    /// The event that has no transition from this phase.
    pub event: RoundEvent,
}

/// Outcome of sending an event to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The phase changed, possibly through the team name guard.
    Transitioned {
        /// Phase before the event.
        from: RoundPhase,
        /// Phase after the event and the guard pass.
        to: RoundPhase,
    },
    /// Only the context changed.
    Updated,
    /// No transition matched; nothing changed.
    Ignored(InvalidTransition),
}

/// Source of wall-clock time for stamping round starts.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: RoundPhase,
    /// Number of events applied so far.
    pub version: usize,
    /// Copy of the round context.
    pub context: RoundContext,
}

/// State machine driving one game: team setup, round play and scoring.
#[derive(Debug, Clone)]
pub struct RoundStateMachine<C = SystemClock> {
    phase: RoundPhase,
    version: usize,
    context: RoundContext,
    thresholds: ThresholdTable,
    clock: C,
}

impl RoundStateMachine<SystemClock> {
    /// Create a machine in [`RoundPhase::LoadingGame`] using the system clock.
    pub fn new(latency_compensation: f64, thresholds: ThresholdTable) -> Self {
        Self::with_clock(latency_compensation, thresholds, SystemClock)
    }
}

impl<C: Clock> RoundStateMachine<C> {
    /// Create a machine in [`RoundPhase::LoadingGame`] with a custom clock.
    pub fn with_clock(latency_compensation: f64, thresholds: ThresholdTable, clock: C) -> Self {
        Self {
            phase: RoundPhase::LoadingGame,
            version: 0,
            context: RoundContext::new(latency_compensation),
            thresholds,
            clock,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Borrow the round context.
    pub fn context(&self) -> &RoundContext {
        &self.context
    }

    /// Scoring curve applied on completion.
    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            context: self.context.clone(),
        }
    }

    /// Record describing the resolved round, available only in [`RoundPhase::RoundFinished`].
    pub fn finished_round(&self) -> Option<StoredRound> {
        if self.phase != RoundPhase::RoundFinished {
            return None;
        }
        let RoundContext {
            team_name,
            game_played_at: Some(game_played_at),
            ms_off: Some(ms_off),
            score: Some(score),
            ..
        } = &self.context
        else {
            return None;
        };

        Some(StoredRound::new(
            team_name.clone(),
            *score,
            *ms_off,
            *game_played_at,
        ))
    }

    /// Process one event to completion, then re-run the team name guard.
    pub fn send(&mut self, event: RoundEvent) -> Dispatch {
        let from = self.phase;
        let Some((next, update)) = self.compute_transition(&event) else {
            return Dispatch::Ignored(InvalidTransition { from, event });
        };

        self.apply_update(update);
        self.phase = next;
        self.settle();
        self.version += 1;

        if self.phase == from {
            Dispatch::Updated
        } else {
            Dispatch::Transitioned {
                from,
                to: self.phase,
            }
        }
    }

    /// Look up the transition table for the current phase and `event`.
    fn compute_transition(&self, event: &RoundEvent) -> Option<(RoundPhase, ContextUpdate)> {
        let transition = match (self.phase, event) {
            (phase, RoundEvent::TeamNameChanged(name)) => {
                (phase, ContextUpdate::TeamName(name.clone()))
            }
            (phase, RoundEvent::LatencyChanged(value)) => (phase, ContextUpdate::Latency(*value)),
            (RoundPhase::LoadingGame, RoundEvent::GameLoaded) => {
                (RoundPhase::SettingUpTeam, ContextUpdate::Keep)
            }
            (RoundPhase::ReadyToStart, RoundEvent::StartRound) => {
                (RoundPhase::RoundPlaying, ContextUpdate::StampPlayedAt)
            }
            (RoundPhase::RoundPlaying, RoundEvent::RoundTimedOut) => (
                RoundPhase::RoundFinished,
                ContextUpdate::Resolve {
                    ms_off: f64::INFINITY,
                    score: 0,
                },
            ),
            (RoundPhase::RoundPlaying, RoundEvent::RoundCompleted { seconds_in }) => {
                let ms_after_start = seconds_in * 1000.0;
                let ms_off = (ms_after_start - IDEAL_HIT_MS - self.context.latency_compensation)
                    .abs();
                let score = self.thresholds.score_for(ms_off);
                (
                    RoundPhase::RoundFinished,
                    ContextUpdate::Resolve { ms_off, score },
                )
            }
            (RoundPhase::RoundFinished, RoundEvent::ResetGame) => {
                (RoundPhase::SettingUpTeam, ContextUpdate::Reset)
            }
            _ => return None,
        };

        Some(transition)
    }

    fn apply_update(&mut self, update: ContextUpdate) {
        match update {
            ContextUpdate::Keep => {}
            ContextUpdate::TeamName(name) => self.context.team_name = name,
            ContextUpdate::Latency(value) => self.context.latency_compensation = value,
            ContextUpdate::StampPlayedAt => {
                self.context.game_played_at = Some(self.clock.now_ms());
            }
            ContextUpdate::Resolve { ms_off, score } => {
                self.context.ms_off = Some(ms_off);
                self.context.score = Some(score);
            }
            ContextUpdate::Reset => {
                self.context = RoundContext::new(self.context.latency_compensation);
            }
        }
    }

    /// Guard-only transitions between team setup and ready-to-start.
    fn settle(&mut self) {
        let valid = self.context.has_valid_team_name();
        self.phase = match self.phase {
            RoundPhase::SettingUpTeam if valid => RoundPhase::ReadyToStart,
            RoundPhase::ReadyToStart if !valid => RoundPhase::SettingUpTeam,
            other => other,
        };
    }
}
