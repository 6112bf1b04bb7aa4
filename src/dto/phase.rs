use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::RoundPhase;

/// Round phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoundPhase {
    /// Backend is still bootstrapping.
    Loading,
    /// Waiting for a team name longer than three characters.
    TeamSetup,
    /// Team name is valid; the round can start.
    Ready,
    /// The song is running.
    Playing,
    /// The round is resolved.
    Finished,
}

impl From<&RoundPhase> for VisibleRoundPhase {
    fn from(value: &RoundPhase) -> Self {
        match value {
            RoundPhase::LoadingGame => VisibleRoundPhase::Loading,
            RoundPhase::SettingUpTeam => VisibleRoundPhase::TeamSetup,
            RoundPhase::ReadyToStart => VisibleRoundPhase::Ready,
            RoundPhase::RoundPlaying => VisibleRoundPhase::Playing,
            RoundPhase::RoundFinished => VisibleRoundPhase::Finished,
        }
    }
}
