//! Group and member management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use divvy_shared::types::GroupId;

use super::{bad_request, field_validation_response, ledger_error_response};
use crate::AppState;

/// Creates the group routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", post(add_member))
}

/// Request body for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    /// Group name.
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,
    /// Initial member names.
    #[serde(default)]
    pub members: Vec<String>,
}

/// Request body for adding a member.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Member display name.
    #[validate(length(min = 1, max = 100, message = "Member name must be 1-100 characters"))]
    pub name: String,
}

/// POST `/groups` - Create a group with an initial member roster.
async fn create_group(
    State(state): State<AppState>,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return field_validation_response(&errors);
    }
    if payload.members.len() > state.config.ledger.max_group_members {
        return bad_request(vec![format!(
            "A group can have at most {} members",
            state.config.ledger.max_group_members
        )]);
    }
    if payload.members.iter().any(String::is_empty) {
        return bad_request(vec!["Member names cannot be empty".to_string()]);
    }

    let group = state.store.create_group(payload.name, payload.members).await;
    info!(group = %group.id, "group created via API");
    (StatusCode::CREATED, Json(group)).into_response()
}

/// GET `/groups/{group_id}` - Fetch a group and its member roster.
async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.store.group(group_id).await {
        Ok(group) => Json(group).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// POST `/groups/{group_id}/members` - Add a member to a group.
async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return field_validation_response(&errors);
    }
    match state.store.group(group_id).await {
        Ok(group) if group.members.len() >= state.config.ledger.max_group_members => {
            return bad_request(vec![format!(
                "A group can have at most {} members",
                state.config.ledger.max_group_members
            )]);
        }
        Ok(_) => {}
        Err(err) => return ledger_error_response(&err),
    }
    match state.store.add_member(group_id, payload.name).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}
