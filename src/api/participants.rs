use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{access_from_headers, parse_session_id, AppState};
use crate::domain::{ChipBreakdown, Decimal, ParticipantId, Transaction};
use crate::engine::{ContributionInput, ParticipantView, ReturnInput, Warning};
use crate::error::AppError;
use crate::orchestration::MutationOutcome;
use crate::store::SaveReport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initial_contribution: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Exactly one of `stacks` (Uniform mode) or `chips` (PerColor mode).
#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    pub stacks: Option<Decimal>,
    pub chips: Option<ChipBreakdown>,
}

/// Exactly one of `count` (Uniform mode) or `chips` (PerColor mode).
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub count: Option<i64>,
    pub chips: Option<ChipBreakdown>,
}

impl TryFrom<ContributionRequest> for ContributionInput {
    type Error = AppError;

    fn try_from(req: ContributionRequest) -> Result<Self, Self::Error> {
        match (req.stacks, req.chips) {
            (Some(stacks), None) => Ok(ContributionInput::Stacks(stacks)),
            (None, Some(chips)) => Ok(ContributionInput::Breakdown(chips)),
            _ => Err(AppError::BadRequest(
                "provide exactly one of stacks or chips".into(),
            )),
        }
    }
}

impl TryFrom<ReturnRequest> for ReturnInput {
    type Error = AppError;

    fn try_from(req: ReturnRequest) -> Result<Self, Self::Error> {
        match (req.count, req.chips) {
            (Some(count), None) => Ok(ReturnInput::Count(count)),
            (None, Some(chips)) => Ok(ReturnInput::Breakdown(chips)),
            _ => Err(AppError::BadRequest(
                "provide exactly one of count or chips".into(),
            )),
        }
    }
}

/// Response body shared by every mutating endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<ParticipantView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
    pub warnings: Vec<Warning>,
    pub total_pot: Decimal,
    pub total_chips: i64,
    pub saved: SaveReport,
}

impl MutationResponse {
    pub fn from_outcome(outcome: MutationOutcome) -> Self {
        let MutationOutcome {
            change,
            summary,
            saved,
        } = outcome;
        let participant = change.participant.as_ref().and_then(|p| {
            summary
                .participants
                .iter()
                .find(|view| view.id == p.id)
                .cloned()
        });

        Self {
            participant,
            transaction: change.transaction,
            warnings: change.warnings,
            total_pot: summary.total_pot,
            total_chips: summary.total_chips,
            saved,
        }
    }
}

pub async fn add_participant(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AddParticipantRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let outcome = state
        .orchestrator
        .mutate(&session_id, access_from_headers(&headers), |ledger| {
            ledger.add_participant(&req.name, req.initial_contribution)
        })
        .await?;
    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn rename_participant(
    Path((session_id, participant_id)): Path<(String, u64)>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RenameRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let participant_id = ParticipantId::new(participant_id);
    let outcome = state
        .orchestrator
        .mutate(&session_id, access_from_headers(&headers), |ledger| {
            ledger.rename_participant(participant_id, &req.name)
        })
        .await?;
    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn record_contribution(
    Path((session_id, participant_id)): Path<(String, u64)>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ContributionRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let input = ContributionInput::try_from(req)?;
    let participant_id = ParticipantId::new(participant_id);
    let outcome = state
        .orchestrator
        .mutate(&session_id, access_from_headers(&headers), |ledger| {
            ledger.record_contribution(participant_id, input)
        })
        .await?;
    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn record_return(
    Path((session_id, participant_id)): Path<(String, u64)>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let input = ReturnInput::try_from(req)?;
    let participant_id = ParticipantId::new(participant_id);
    let outcome = state
        .orchestrator
        .mutate(&session_id, access_from_headers(&headers), |ledger| {
            ledger.record_return(participant_id, input)
        })
        .await?;
    Ok(Json(MutationResponse::from_outcome(outcome)))
}
