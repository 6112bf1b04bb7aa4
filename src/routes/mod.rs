use axum::Router;

use crate::state::SharedState;

/// Swagger UI.
pub mod docs;
/// Round commands.
pub mod game;
/// Health check.
pub mod health;
/// Finished rounds.
pub mod rounds;
/// Settings management.
pub mod settings;
/// Public event stream.
pub mod sse;

/// Compose all route trees and hand them the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(sse::router())
        .merge(game::router())
        .merge(rounds::router())
        .merge(settings::router())
        .merge(docs::router())
        .with_state(state)
}
