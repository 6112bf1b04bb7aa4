use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::phase::VisibleRoundPhase;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "loading").
    pub status: String,
    /// Current phase of the round machine.
    pub phase: VisibleRoundPhase,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(phase: VisibleRoundPhase) -> Self {
        Self {
            status: "ok".to_string(),
            phase,
        }
    }

    /// Create a health response indicating the game has not finished bootstrapping.
    pub fn loading() -> Self {
        Self {
            status: "loading".to_string(),
            phase: VisibleRoundPhase::Loading,
        }
    }
}
