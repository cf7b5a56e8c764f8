//! Balance and suggested-payment read routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use divvy_shared::types::GroupId;

use super::ledger_error_response;
use crate::AppState;

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/balances", get(get_balances))
        .route(
            "/groups/{group_id}/balances/suggestions",
            get(get_suggestions),
        )
}

/// GET `/groups/{group_id}/balances` - Net pairwise balances.
///
/// Returns one directed `{from, to, amount}` edge per indebted pair:
/// exactly the shape "You owe" / "Owed to you" displays consume.
async fn get_balances(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.store.balances(group_id).await {
        Ok(balances) => Json(json!({ "balances": balances })).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// GET `/groups/{group_id}/balances/suggestions` - Simplified payments.
///
/// Advisory: the pairwise balances remain the source of truth.
async fn get_suggestions(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.store.suggested_settlements(group_id).await {
        Ok(suggestions) => Json(json!({ "suggestions": suggestions })).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}
