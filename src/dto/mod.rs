use std::time::{Duration, SystemTime, UNIX_EPOCH};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Round snapshot and round command payloads.
pub mod game;
/// Health check response.
pub mod health;
/// Client-facing round phase.
pub mod phase;
/// Finished rounds listing.
pub mod rounds;
/// Settings payloads.
pub mod settings;
/// SSE event payloads.
pub mod sse;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Render epoch milliseconds as an RFC 3339 timestamp.
pub(crate) fn format_epoch_ms(ms: u64) -> String {
    format_system_time(UNIX_EPOCH + Duration::from_millis(ms))
}

/// Infinite deviations are timeouts and have no numeric value on the wire.
pub(crate) fn finite_ms_off(ms_off: f64) -> Option<f64> {
    ms_off.is_finite().then_some(ms_off)
}
