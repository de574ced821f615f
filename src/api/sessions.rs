use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::participants::MutationResponse;
use crate::api::{access_from_headers, parse_session_id, AppState};
use crate::domain::{ChipValueMode, ColorValues, Decimal, SessionConfig, SessionId};
use crate::engine::{summarize, SessionSummary};
use crate::error::AppError;
use crate::store::SaveReport;

/// Overrides applied on top of the server's default session configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub chip_value_mode: Option<ChipValueMode>,
    pub stack_unit_value: Option<Decimal>,
    pub chips_per_stack: Option<i64>,
    pub color_values: Option<ColorValues>,
}

impl CreateSessionRequest {
    fn apply(self, mut config: SessionConfig) -> Result<SessionConfig, AppError> {
        if let Some(mode) = self.chip_value_mode {
            config.chip_value_mode = mode;
        }
        if let Some(value) = self.stack_unit_value {
            if value.is_negative() {
                return Err(AppError::BadRequest(
                    "stackUnitValue must be non-negative".into(),
                ));
            }
            config.stack_unit_value = value;
        }
        if let Some(chips) = self.chips_per_stack {
            if chips < 0 {
                return Err(AppError::BadRequest(
                    "chipsPerStack must be non-negative".into(),
                ));
            }
            config.chips_per_stack = chips;
        }
        if let Some(values) = self.color_values {
            if crate::domain::ChipColor::ALL
                .iter()
                .any(|c| values.value(*c).is_negative())
            {
                return Err(AppError::BadRequest(
                    "colorValues must be non-negative".into(),
                ));
            }
            config.color_values = values;
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub config: SessionConfig,
    pub saved: SaveReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    pub sessions: Vec<SessionId>,
}

pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let config = request.apply(state.orchestrator.default_config())?;
    let (session_id, saved) = state.orchestrator.create_session(Some(config)).await?;

    Ok(Json(CreateSessionResponse {
        session_id,
        config,
        saved,
    }))
}

pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = state.orchestrator.list_sessions().await?;
    Ok(Json(SessionListResponse { sessions }))
}

pub async fn get_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SessionSummary>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let snapshot = state.orchestrator.snapshot(&session_id).await?;
    Ok(Json(summarize(&snapshot)))
}

pub async fn reset_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MutationResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let outcome = state
        .orchestrator
        .mutate(&session_id, access_from_headers(&headers), |ledger| {
            ledger.reset()
        })
        .await?;
    Ok(Json(MutationResponse::from_outcome(outcome)))
}
