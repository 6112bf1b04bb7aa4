/// OpenAPI documentation generation.
pub mod documentation;
/// Round host: commands, round timer, persistence and notification of finished rounds.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Chat webhook delivery of round summaries.
pub mod notifier;
/// Latency, webhook and notification switch management.
pub mod settings_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
