//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;

use divvy_core::error::LedgerError;
use divvy_shared::types::Money;

use crate::AppState;

pub mod balances;
pub mod expenses;
pub mod groups;
pub mod health;
pub mod settlements;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(groups::routes())
        .merge(expenses::routes())
        .merge(settlements::routes())
        .merge(balances::routes())
}

/// Maps a core error onto the wire format:
/// `{"error": {"code", "message", "details": [..]}}`.
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let details: Vec<String> = err.issues().iter().map(ToString::to_string).collect();
    (
        status,
        Json(json!({
            "error": {
                "code": err.error_code(),
                "message": err.to_string(),
                "details": details,
            }
        })),
    )
        .into_response()
}

/// A 400 response enumerating request-level problems (unparseable
/// amounts, missing fields) in the same wire shape as core validation
/// errors.
pub(crate) fn bad_request(details: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "Request validation failed",
                "details": details,
            }
        })),
    )
        .into_response()
}

/// Maps `validator` derive failures onto the wire format.
pub(crate) fn field_validation_response(errors: &validator::ValidationErrors) -> Response {
    let details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map_or_else(|| format!("Invalid value for {field}"), ToString::to_string)
            })
        })
        .collect();
    bad_request(details)
}

/// Parses a decimal-string amount, pushing a readable message into
/// `errors` on failure.
pub(crate) fn parse_money(field: &str, value: &str, errors: &mut Vec<String>) -> Option<Money> {
    match value.parse::<Money>() {
        Ok(money) => Some(money),
        Err(parse_error) => {
            errors.push(format!("{field}: {parse_error}"));
            None
        }
    }
}
