//! Expense management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;
use validator::Validate;

use divvy_core::expense::{Contribution, CreateExpenseInput};
use divvy_core::split::{Item, Percent, SplitMode, SplitSpec};
use divvy_shared::types::{ExpenseId, GroupId, MemberId, PageRequest};

use super::{bad_request, field_validation_response, ledger_error_response, parse_money};
use crate::AppState;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/expenses", get(list_expenses))
        .route("/groups/{group_id}/expenses", post(create_expense))
        .route("/groups/{group_id}/expenses/{expense_id}", get(get_expense))
        .route(
            "/groups/{group_id}/expenses/{expense_id}",
            delete(delete_expense),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating an expense.
///
/// Amounts are decimal strings with at most two fractional digits;
/// percentages are decimal strings with at most one.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    /// Description of the expense.
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: String,
    /// Total amount, e.g. `"30.00"`.
    pub amount: String,
    /// How to divide the total: `equal`, `percentage`, `custom`, `items`.
    pub split_type: SplitMode,
    /// Participants sharing the expense.
    pub participants: Vec<MemberId>,
    /// Per-participant split parameters (percentage and custom modes).
    #[serde(default)]
    pub splits: Vec<SplitEntryRequest>,
    /// Who paid, and how much each.
    pub contributors: Vec<ContributorRequest>,
    /// Line items (items mode).
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

/// A per-participant split parameter.
#[derive(Debug, Deserialize)]
pub struct SplitEntryRequest {
    /// The participant.
    pub user: MemberId,
    /// Exact amount (custom mode).
    pub amount: Option<String>,
    /// Percentage with one decimal place (percentage mode).
    pub percentage: Option<String>,
}

/// A single contributor's payment.
#[derive(Debug, Deserialize)]
pub struct ContributorRequest {
    /// The paying member.
    pub user: MemberId,
    /// The amount they paid.
    pub amount: String,
}

/// A line item on an itemized expense.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    /// Item name.
    pub name: String,
    /// Item price.
    pub price: String,
    /// Participants this item is assigned to.
    pub assigned_to: Vec<MemberId>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/groups/{group_id}/expenses` - List expenses, newest first.
async fn list_expenses(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.store.list_expenses(group_id, page).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// POST `/groups/{group_id}/expenses` - Create an expense.
async fn create_expense(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return field_validation_response(&errors);
    }

    let mut errors = Vec::new();
    let total = parse_money("amount", &payload.amount, &mut errors);

    let contributions: Vec<Contribution> = payload
        .contributors
        .iter()
        .enumerate()
        .filter_map(|(index, contributor)| {
            parse_money(
                &format!("contributors[{index}].amount"),
                &contributor.amount,
                &mut errors,
            )
            .map(|amount| Contribution {
                payer: contributor.user,
                amount,
            })
        })
        .collect();

    let split = build_split_spec(&payload, &mut errors);

    let (Some(total), Some(split)) = (total, split) else {
        return bad_request(errors);
    };
    if !errors.is_empty() {
        return bad_request(errors);
    }

    let input = CreateExpenseInput {
        group: group_id,
        description: payload.description,
        total,
        participants: payload.participants,
        split,
        contributions,
    };

    match state.store.record_expense(input).await {
        Ok(expense) => {
            info!(group = %group_id, expense = %expense.id, "expense created via API");
            (StatusCode::CREATED, Json(expense)).into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}

/// GET `/groups/{group_id}/expenses/{expense_id}` - Fetch one expense.
async fn get_expense(
    State(state): State<AppState>,
    Path((group_id, expense_id)): Path<(GroupId, ExpenseId)>,
) -> impl IntoResponse {
    match state.store.expense(group_id, expense_id).await {
        Ok(expense) => Json(expense).into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// DELETE `/groups/{group_id}/expenses/{expense_id}` - Delete an expense.
async fn delete_expense(
    State(state): State<AppState>,
    Path((group_id, expense_id)): Path<(GroupId, ExpenseId)>,
) -> impl IntoResponse {
    match state.store.delete_expense(group_id, expense_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

// ============================================================================
// Request -> Core Conversion
// ============================================================================

/// Builds the mode-specific split parameters, pushing a readable
/// message into `errors` for every problem found.
fn build_split_spec(payload: &CreateExpenseRequest, errors: &mut Vec<String>) -> Option<SplitSpec> {
    match payload.split_type {
        SplitMode::Equal => Some(SplitSpec::Equal),
        SplitMode::Percentage => {
            let mut entries = Vec::with_capacity(payload.splits.len());
            for (index, entry) in payload.splits.iter().enumerate() {
                let Some(text) = entry.percentage.as_deref() else {
                    errors.push(format!(
                        "splits[{index}].percentage is required for percentage splits"
                    ));
                    continue;
                };
                match parse_percent(text) {
                    Ok(percent) => entries.push((entry.user, percent)),
                    Err(message) => {
                        errors.push(format!("splits[{index}].percentage: {message}"));
                    }
                }
            }
            errors.is_empty().then_some(SplitSpec::Percentage(entries))
        }
        SplitMode::Custom => {
            let mut entries = Vec::with_capacity(payload.splits.len());
            for (index, entry) in payload.splits.iter().enumerate() {
                let Some(text) = entry.amount.as_deref() else {
                    errors.push(format!(
                        "splits[{index}].amount is required for custom splits"
                    ));
                    continue;
                };
                if let Some(amount) =
                    parse_money(&format!("splits[{index}].amount"), text, errors)
                {
                    entries.push((entry.user, amount));
                }
            }
            errors.is_empty().then_some(SplitSpec::Custom(entries))
        }
        SplitMode::Itemized => {
            let mut items = Vec::with_capacity(payload.items.len());
            for (index, item) in payload.items.iter().enumerate() {
                if let Some(price) =
                    parse_money(&format!("items[{index}].price"), &item.price, errors)
                {
                    items.push(Item {
                        name: item.name.clone(),
                        price,
                        assignees: item.assigned_to.clone(),
                    });
                }
            }
            errors.is_empty().then_some(SplitSpec::Itemized(items))
        }
    }
}

fn parse_percent(text: &str) -> Result<Percent, String> {
    let decimal =
        Decimal::from_str(text.trim()).map_err(|_| format!("Invalid percentage: {text:?}"))?;
    Percent::try_from_decimal(decimal).map_err(|err| err.to_string())
}
