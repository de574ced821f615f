use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{parse_session_id, AppState};
use crate::domain::Transaction;
use crate::engine::transaction_log;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    /// Most recent first.
    pub transactions: Vec<Transaction>,
    pub count: usize,
}

pub async fn get_transactions(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let snapshot = state.orchestrator.snapshot(&session_id).await?;
    let transactions: Vec<Transaction> =
        transaction_log(&snapshot).into_iter().cloned().collect();

    Ok(Json(TransactionsResponse {
        count: transactions.len(),
        transactions,
    }))
}
