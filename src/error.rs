use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::LedgerError;
use crate::orchestration::OrchestrationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ReadOnly => AppError::Forbidden(err.to_string()),
            LedgerError::UnknownParticipant(_) => AppError::NotFound(err.to_string()),
            LedgerError::InvalidAmount(_)
            | LedgerError::ZeroContribution
            | LedgerError::ZeroReturn
            | LedgerError::ModeMismatch { .. }
            | LedgerError::Overflow => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<OrchestrationError> for AppError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::SessionNotFound(_) => AppError::NotFound(err.to_string()),
            OrchestrationError::Ledger(e) => e.into(),
            OrchestrationError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParticipantId, SessionId};

    #[test]
    fn test_ledger_error_status_mapping() {
        let status = |err: LedgerError| AppError::from(err).into_response().status();
        assert_eq!(status(LedgerError::ReadOnly), StatusCode::FORBIDDEN);
        assert_eq!(
            status(LedgerError::UnknownParticipant(ParticipantId::new(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(LedgerError::ZeroReturn), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_session_is_not_found() {
        let err = OrchestrationError::SessionNotFound(SessionId::generate());
        assert_eq!(
            AppError::from(err).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
