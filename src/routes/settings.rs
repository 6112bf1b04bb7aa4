use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::settings::{
        SettingsResponse, SuspendNotificationsRequest, UpdateLatencyRequest, UpdateWebhookRequest,
    },
    error::AppError,
    services::settings_service,
    state::SharedState,
};

/// Routes managing latency, webhook and notification settings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings/latency", put(update_latency))
        .route("/settings/webhook", put(update_webhook).delete(clear_webhook))
        .route("/settings/suspend", put(set_suspend))
        .route("/settings/suspend/toggle", post(toggle_suspend))
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses((status = 200, description = "Current settings", body = SettingsResponse))
)]
/// Current settings.
pub async fn get_settings(State(state): State<SharedState>) -> Json<SettingsResponse> {
    Json(settings_service::get_settings(&state).await)
}

#[utoipa::path(
    put,
    path = "/settings/latency",
    tag = "settings",
    request_body = UpdateLatencyRequest,
    responses((status = 200, description = "Latency saved", body = SettingsResponse))
)]
/// Save the latency compensation; anything that is not a non-negative number is stored as 0.
pub async fn update_latency(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateLatencyRequest>,
) -> Json<SettingsResponse> {
    Json(settings_service::save_latency_compensation(&state, payload.latency_compensation).await)
}

#[utoipa::path(
    put,
    path = "/settings/webhook",
    tag = "settings",
    request_body = UpdateWebhookRequest,
    responses(
        (status = 200, description = "Webhook saved", body = SettingsResponse),
        (status = 400, description = "Blank or oversized URL")
    )
)]
/// Save the chat webhook URL.
pub async fn update_webhook(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateWebhookRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    payload.validate()?;
    let settings = settings_service::save_webhook(&state, &payload.url).await?;
    Ok(Json(settings))
}

#[utoipa::path(
    delete,
    path = "/settings/webhook",
    tag = "settings",
    responses((status = 200, description = "Webhook cleared", body = SettingsResponse))
)]
/// Forget the chat webhook URL.
pub async fn clear_webhook(State(state): State<SharedState>) -> Json<SettingsResponse> {
    Json(settings_service::clear_webhook(&state).await)
}

#[utoipa::path(
    put,
    path = "/settings/suspend",
    tag = "settings",
    request_body = SuspendNotificationsRequest,
    responses((status = 200, description = "Suspension applied", body = SettingsResponse))
)]
/// Withhold or resume round summaries. The switch is not persisted.
pub async fn set_suspend(
    State(state): State<SharedState>,
    Json(payload): Json<SuspendNotificationsRequest>,
) -> Json<SettingsResponse> {
    Json(settings_service::set_suspend_notifications(&state, payload.suspended).await)
}

#[utoipa::path(
    post,
    path = "/settings/suspend/toggle",
    tag = "settings",
    responses((status = 200, description = "Suspension flipped", body = SettingsResponse))
)]
/// Flip the notification switch.
pub async fn toggle_suspend(State(state): State<SharedState>) -> Json<SettingsResponse> {
    Json(settings_service::toggle_suspend_notifications(&state).await)
}
