use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the Whitney Challenge backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::game::get_game,
        crate::routes::game::update_team,
        crate::routes::game::start_round,
        crate::routes::game::complete_round,
        crate::routes::game::time_out_round,
        crate::routes::game::reset_game,
        crate::routes::rounds::list_rounds,
        crate::routes::rounds::clear_rounds,
        crate::routes::settings::get_settings,
        crate::routes::settings::update_latency,
        crate::routes::settings::update_webhook,
        crate::routes::settings::clear_webhook,
        crate::routes::settings::set_suspend,
        crate::routes::settings::toggle_suspend,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisibleRoundPhase,
            crate::dto::game::RoundSnapshot,
            crate::dto::game::UpdateTeamRequest,
            crate::dto::game::CompleteRoundRequest,
            crate::dto::rounds::RoundOrder,
            crate::dto::rounds::RoundSummary,
            crate::dto::settings::SettingsResponse,
            crate::dto::settings::LatencyInput,
            crate::dto::settings::UpdateLatencyRequest,
            crate::dto::settings::UpdateWebhookRequest,
            crate::dto::settings::SuspendNotificationsRequest,
            crate::dto::sse::RoundsUpdatedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "game", description = "Round lifecycle commands"),
        (name = "rounds", description = "Finished rounds history and leaderboard"),
        (name = "settings", description = "Latency, webhook and notification settings"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_round_commands() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/healthcheck",
            "/game",
            "/game/start",
            "/game/complete",
            "/rounds",
            "/settings/webhook",
            "/sse/public",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
