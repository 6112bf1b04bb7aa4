use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::rounds::{RoundSummary, RoundsQuery},
    services::game_service,
    state::SharedState,
};

/// Routes exposing the finished rounds.
pub fn router() -> Router<SharedState> {
    Router::new().route("/rounds", get(list_rounds).delete(clear_rounds))
}

/// History of finished rounds, or the leaderboard with `sort=score`.
#[utoipa::path(
    get,
    path = "/rounds",
    tag = "rounds",
    params(RoundsQuery),
    responses((status = 200, description = "Finished rounds", body = [RoundSummary]))
)]
pub async fn list_rounds(
    State(state): State<SharedState>,
    Query(query): Query<RoundsQuery>,
) -> Json<Vec<RoundSummary>> {
    Json(game_service::list_rounds(&state, query.sort).await)
}

/// Forget every finished round.
#[utoipa::path(
    delete,
    path = "/rounds",
    tag = "rounds",
    responses((status = 204, description = "History cleared"))
)]
pub async fn clear_rounds(State(state): State<SharedState>) -> StatusCode {
    game_service::clear_rounds(&state).await;
    StatusCode::NO_CONTENT
}
