use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{parse_session_id, AppState};
use crate::engine::{
    house_settlement, player_settlement, HouseSettlement, PlayerSettlement, SettlementMode,
};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct SettlementQuery {
    pub mode: Option<SettlementMode>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SettlementResponse {
    House(HouseSettlement),
    Players(PlayerSettlement),
}

pub async fn get_settlement(
    Path(session_id): Path<String>,
    Query(params): Query<SettlementQuery>,
    State(state): State<AppState>,
) -> Result<Json<SettlementResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let snapshot = state.orchestrator.snapshot(&session_id).await?;

    let response = match params.mode.unwrap_or_default() {
        SettlementMode::House => SettlementResponse::House(house_settlement(&snapshot)),
        SettlementMode::Players => SettlementResponse::Players(player_settlement(&snapshot)),
    };
    Ok(Json(response))
}
