//! Settlement management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::info;

use divvy_shared::types::{GroupId, MemberId, PageRequest, SettlementId};

use super::{bad_request, ledger_error_response, parse_money};
use crate::AppState;

/// Creates the settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/settlements", get(list_settlements))
        .route("/groups/{group_id}/settlements", post(create_settlement))
        .route(
            "/groups/{group_id}/settlements/{settlement_id}",
            patch(update_settlement),
        )
        .route(
            "/groups/{group_id}/settlements/{settlement_id}",
            delete(delete_settlement),
        )
        .route(
            "/groups/{group_id}/settlements/{settlement_id}/approve",
            post(approve_settlement),
        )
}

/// Request body for creating a settlement: `from` pays `to`.
#[derive(Debug, Deserialize)]
pub struct CreateSettlementRequest {
    /// The paying member.
    pub from: MemberId,
    /// The receiving member.
    pub to: MemberId,
    /// The amount, e.g. `"50.00"`.
    pub amount: String,
}

/// Request body for editing a settlement amount.
#[derive(Debug, Deserialize)]
pub struct UpdateSettlementRequest {
    /// The member making the edit (must be the payer).
    pub actor: MemberId,
    /// The new amount.
    pub amount: String,
}

/// Request body for approving a settlement.
#[derive(Debug, Deserialize)]
pub struct ApproveSettlementRequest {
    /// The member approving (must be the receiver).
    pub actor: MemberId,
}

/// Query parameters identifying the acting member on a delete.
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    /// The member requesting the deletion (must be the payer).
    pub actor: MemberId,
}

/// GET `/groups/{group_id}/settlements` - List settlements, newest first.
async fn list_settlements(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.store.list_settlements(group_id, page).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// POST `/groups/{group_id}/settlements` - Record a payment.
async fn create_settlement(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(payload): Json<CreateSettlementRequest>,
) -> impl IntoResponse {
    let mut errors = Vec::new();
    let Some(amount) = parse_money("amount", &payload.amount, &mut errors) else {
        return bad_request(errors);
    };

    match state
        .store
        .record_settlement(group_id, payload.from, payload.to, amount)
        .await
    {
        Ok(settlement) => {
            info!(group = %group_id, settlement = %settlement.id, "settlement created via API");
            (StatusCode::CREATED, Json(settlement)).into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}

/// PATCH `/groups/{group_id}/settlements/{settlement_id}` - Edit the amount.
async fn update_settlement(
    State(state): State<AppState>,
    Path((group_id, settlement_id)): Path<(GroupId, SettlementId)>,
    Json(payload): Json<UpdateSettlementRequest>,
) -> impl IntoResponse {
    let mut errors = Vec::new();
    let Some(amount) = parse_money("amount", &payload.amount, &mut errors) else {
        return bad_request(errors);
    };

    match state
        .store
        .update_settlement(group_id, settlement_id, payload.actor, amount)
        .await
    {
        Ok(settlement) => Json(settlement).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// DELETE `/groups/{group_id}/settlements/{settlement_id}` - Remove a payment.
async fn delete_settlement(
    State(state): State<AppState>,
    Path((group_id, settlement_id)): Path<(GroupId, SettlementId)>,
    Query(query): Query<ActorQuery>,
) -> impl IntoResponse {
    match state
        .store
        .delete_settlement(group_id, settlement_id, query.actor)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// POST `/groups/{group_id}/settlements/{settlement_id}/approve` - The
/// receiver accepts the payment, freezing the record.
async fn approve_settlement(
    State(state): State<AppState>,
    Path((group_id, settlement_id)): Path<(GroupId, SettlementId)>,
    Json(payload): Json<ApproveSettlementRequest>,
) -> impl IntoResponse {
    match state
        .store
        .approve_settlement(group_id, settlement_id, payload.actor)
        .await
    {
        Ok(settlement) => Json(settlement).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}
