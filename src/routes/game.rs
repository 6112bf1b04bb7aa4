use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::game::{CompleteRoundRequest, RoundSnapshot, UpdateTeamRequest},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes driving the round machine.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game", get(get_game))
        .route("/game/team", put(update_team))
        .route("/game/start", post(start_round))
        .route("/game/complete", post(complete_round))
        .route("/game/timeout", post(time_out_round))
        .route("/game/reset", post(reset_game))
}

/// Current phase and round context.
#[utoipa::path(
    get,
    path = "/game",
    tag = "game",
    responses((status = 200, description = "Current round state", body = RoundSnapshot))
)]
pub async fn get_game(State(state): State<SharedState>) -> Json<RoundSnapshot> {
    Json(game_service::snapshot(&state).await)
}

/// Replace the team name while setting up the round.
#[utoipa::path(
    put,
    path = "/game/team",
    tag = "game",
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team name applied", body = RoundSnapshot)
    )
)]
pub async fn update_team(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateTeamRequest>,
) -> Json<RoundSnapshot> {
    Json(game_service::update_team_name(&state, payload.name).await)
}

/// Start the round once the team is ready.
#[utoipa::path(
    post,
    path = "/game/start",
    tag = "game",
    responses(
        (status = 200, description = "Round started", body = RoundSnapshot),
        (status = 409, description = "Round cannot start now")
    )
)]
pub async fn start_round(
    State(state): State<SharedState>,
) -> Result<Json<RoundSnapshot>, AppError> {
    let snapshot = game_service::start_round(&state).await?;
    Ok(Json(snapshot))
}

/// Report the team's hit and score the round.
#[utoipa::path(
    post,
    path = "/game/complete",
    tag = "game",
    request_body = CompleteRoundRequest,
    responses(
        (status = 200, description = "Round scored", body = RoundSnapshot),
        (status = 400, description = "Invalid elapsed time"),
        (status = 409, description = "No round is playing")
    )
)]
pub async fn complete_round(
    State(state): State<SharedState>,
    Json(payload): Json<CompleteRoundRequest>,
) -> Result<Json<RoundSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = game_service::complete_round(&state, payload.seconds_in).await?;
    Ok(Json(snapshot))
}

/// Give up on the current round.
#[utoipa::path(
    post,
    path = "/game/timeout",
    tag = "game",
    responses(
        (status = 200, description = "Round timed out", body = RoundSnapshot),
        (status = 409, description = "No round is playing")
    )
)]
pub async fn time_out_round(
    State(state): State<SharedState>,
) -> Result<Json<RoundSnapshot>, AppError> {
    let snapshot = game_service::time_out_round(&state).await?;
    Ok(Json(snapshot))
}

/// Return to team setup after a finished round.
#[utoipa::path(
    post,
    path = "/game/reset",
    tag = "game",
    responses(
        (status = 200, description = "Back to team setup", body = RoundSnapshot),
        (status = 409, description = "Round is not finished")
    )
)]
pub async fn reset_game(
    State(state): State<SharedState>,
) -> Result<Json<RoundSnapshot>, AppError> {
    let snapshot = game_service::reset_game(&state).await?;
    Ok(Json(snapshot))
}
