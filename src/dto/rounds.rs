use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::StoredRound,
    dto::{finite_ms_off, format_epoch_ms},
};

/// Ordering of the rounds listing.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundOrder {
    /// Insertion order (history).
    #[default]
    Recorded,
    /// Highest score first, closest hit breaking ties (leaderboard).
    Score,
}

/// Query parameters of the rounds listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoundsQuery {
    /// Ordering of the listing, `recorded` when omitted.
    #[serde(default)]
    pub sort: RoundOrder,
}

/// Public projection of a finished round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundSummary {
    /// Identifier, equal to `game_played_at`.
    pub id: u64,
    /// Team that played the round.
    pub team_name: String,
    /// Points earned.
    pub score: u32,
    /// Deviation from the ideal hit, absent for a timeout.
    pub ms_off: Option<f64>,
    /// True when the round ended on the timer.
    pub timed_out: bool,
    /// Epoch milliseconds of the round start.
    pub game_played_at: u64,
    /// RFC 3339 rendering of `game_played_at`.
    pub played_at: String,
}

impl From<StoredRound> for RoundSummary {
    fn from(round: StoredRound) -> Self {
        Self {
            id: round.id,
            timed_out: round.timed_out(),
            ms_off: finite_ms_off(round.ms_off),
            played_at: format_epoch_ms(round.game_played_at),
            team_name: round.team_name,
            score: round.score,
            game_played_at: round.game_played_at,
        }
    }
}
