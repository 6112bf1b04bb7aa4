use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dto::phase::VisibleRoundPhase, state::state_machine::InvalidTransition};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The round machine has no transition for the command in its current phase.
    #[error(transparent)]
    RoundRejected(#[from] InvalidTransition),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The command does not apply to the current phase.
    #[error("conflict: {message}")]
    Conflict {
        /// What was rejected.
        message: String,
        /// Phase the machine stayed in.
        phase: VisibleRoundPhase,
    },
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::RoundRejected(invalid) => AppError::Conflict {
                phase: (&invalid.from).into(),
                message: invalid.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<VisibleRoundPhase>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, phase) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::Conflict { phase, .. } => (StatusCode::CONFLICT, Some(*phase)),
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            phase,
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state_machine::{RoundEvent, RoundPhase};

    #[test]
    fn rejected_command_becomes_a_conflict_with_the_phase() {
        let err = ServiceError::from(InvalidTransition {
            from: RoundPhase::SettingUpTeam,
            event: RoundEvent::StartRound,
        });

        match AppError::from(err) {
            AppError::Conflict { phase, .. } => assert_eq!(phase, VisibleRoundPhase::TeamSetup),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn status_codes_follow_the_error_kind() {
        let bad = AppError::BadRequest("nope".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let conflict = AppError::Conflict {
            message: "busy".into(),
            phase: VisibleRoundPhase::Playing,
        }
        .into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
    }
}
