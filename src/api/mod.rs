pub mod health;
pub mod participants;
pub mod sessions;
pub mod settlement;
pub mod transactions;

use crate::domain::SessionId;
use crate::engine::Access;
use crate::error::AppError;
use crate::orchestration::SessionOrchestrator;
use axum::http::HeaderMap;
use axum::routing::{get, patch, post};
use axum::Router;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Header carrying the caller's capability for the session.
pub const ACCESS_HEADER: &str = "x-session-access";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SessionOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/v1/sessions/:session_id", get(sessions::get_session))
        .route("/v1/sessions/:session_id/reset", post(sessions::reset_session))
        .route(
            "/v1/sessions/:session_id/participants",
            post(participants::add_participant),
        )
        .route(
            "/v1/sessions/:session_id/participants/:participant_id",
            patch(participants::rename_participant),
        )
        .route(
            "/v1/sessions/:session_id/participants/:participant_id/contributions",
            post(participants::record_contribution),
        )
        .route(
            "/v1/sessions/:session_id/participants/:participant_id/returns",
            post(participants::record_return),
        )
        .route(
            "/v1/sessions/:session_id/transactions",
            get(transactions::get_transactions),
        )
        .route(
            "/v1/sessions/:session_id/settlement",
            get(settlement::get_settlement),
        )
        .layer(cors)
        .with_state(state)
}

/// `view` opens a view-only ledger; anything else (or no header) opens an editable one.
pub fn access_from_headers(headers: &HeaderMap) -> Access {
    match headers
        .get(ACCESS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
    {
        Some(v) if v == "view" => Access::ViewOnly,
        _ => Access::Edit,
    }
}

pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    SessionId::from_str(raw).map_err(|_| AppError::BadRequest("Invalid session id".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_access_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(access_from_headers(&headers), Access::Edit);

        headers.insert(ACCESS_HEADER, HeaderValue::from_static("View"));
        assert_eq!(access_from_headers(&headers), Access::ViewOnly);

        headers.insert(ACCESS_HEADER, HeaderValue::from_static("edit"));
        assert_eq!(access_from_headers(&headers), Access::Edit);
    }

    #[test]
    fn test_parse_session_id_rejects_garbage() {
        assert!(parse_session_id("nope").is_err());
        let id = SessionId::generate();
        assert_eq!(parse_session_id(&id.to_string()).unwrap(), id);
    }
}
