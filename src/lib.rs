//! Library crate for whitney-challenge-back, exposing modules for binaries and tests.

/// Runtime configuration loading.
pub mod config;
/// Slot storage and persisted records.
pub mod dao;
/// Wire types for REST and SSE.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Round host, settings, notifications and SSE services.
pub mod services;
/// Shared application state and the round state machine.
pub mod state;
