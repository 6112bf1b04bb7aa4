use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{finite_ms_off, format_epoch_ms, phase::VisibleRoundPhase},
    state::state_machine::Snapshot,
};

/// Payload replacing the team name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTeamRequest {
    /// New team name, free text; it must be longer than three characters to start a round.
    pub name: String,
}

/// Payload reporting the team's hit.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CompleteRoundRequest {
    /// Seconds elapsed between the song start and the hit.
    #[validate(range(min = 0.0))]
    pub seconds_in: f64,
}

/// Public projection of the round machine.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundSnapshot {
    /// Current phase of the round machine.
    pub phase: VisibleRoundPhase,
    /// Number of events applied since startup.
    pub version: usize,
    /// Team currently at the buzzer.
    pub team_name: String,
    /// Milliseconds added to the ideal hit instant.
    pub latency_compensation: f64,
    /// Epoch milliseconds of the round start.
    pub game_played_at: Option<u64>,
    /// RFC 3339 rendering of `game_played_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_at: Option<String>,
    /// Deviation from the ideal hit; absent while unresolved or after a timeout.
    pub ms_off: Option<f64>,
    /// Points earned, once the round is resolved.
    pub score: Option<u32>,
    /// True when the round ended on the timer.
    pub timed_out: bool,
}

impl From<&Snapshot> for RoundSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let context = &snapshot.context;
        Self {
            phase: (&snapshot.phase).into(),
            version: snapshot.version,
            team_name: context.team_name.clone(),
            latency_compensation: context.latency_compensation,
            game_played_at: context.game_played_at,
            played_at: context.game_played_at.map(format_epoch_ms),
            ms_off: context.ms_off.and_then(finite_ms_off),
            score: context.score,
            timed_out: context.ms_off.is_some_and(f64::is_infinite),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_elapsed_time_is_rejected() {
        let request = CompleteRoundRequest { seconds_in: -0.5 };
        assert!(request.validate().is_err());
        let request = CompleteRoundRequest { seconds_in: 19.0 };
        assert!(request.validate().is_ok());
    }
}
