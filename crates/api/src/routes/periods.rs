//! Period status, activity and close workflow routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, middleware::AuthUser};
use closebook_core::close::{
    CloseOutcome, CloseRun, CloseRunRequest, ReopenOutcome, ReopenRequest,
};
use closebook_core::ledger::AccountActivity;
use closebook_core::period::{CloseStatus, FiscalPeriod, PeriodStatus};
use closebook_shared::types::{AccountId, BookId, FiscalPeriodId};

/// Creates the period routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/{book_id}/fiscal-periods", get(resolve_period))
        .route("/books/{book_id}/periods/{period_id}/status", get(get_status))
        .route("/books/{book_id}/periods/{period_id}/activity", get(get_activity))
        .route("/books/{book_id}/periods/{period_id}/close", post(close_period))
        .route("/books/{book_id}/periods/{period_id}/reopen", post(reopen_period))
        .route("/books/{book_id}/periods/{period_id}/close-runs", get(list_runs))
}

/// Query parameters for resolving a period.
#[derive(Debug, Deserialize)]
pub struct ResolvePeriodQuery {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Period number.
    pub period_no: i32,
    /// Selects the adjustment period sharing the number.
    #[serde(default)]
    pub is_adjustment: bool,
}

/// Response for a period status.
#[derive(Debug, Serialize)]
pub struct PeriodStatusResponse {
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// OPEN, SOFT_CLOSED or HARD_CLOSED.
    pub status: PeriodStatus,
}

/// Response for period activity.
#[derive(Debug, Serialize)]
pub struct PeriodActivityResponse {
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Σ(credit − debit) over revenue and expense accounts.
    pub net_income: Decimal,
    /// Per-account totals.
    pub accounts: Vec<AccountActivity>,
}

/// Request body for closing a period.
#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    /// SOFT_CLOSED or HARD_CLOSED.
    pub close_status: CloseStatus,
    /// Equity account receiving net income.
    pub retained_earnings_account_id: AccountId,
    /// Free-form note.
    pub note: Option<String>,
}

/// Request body for reopening a period.
#[derive(Debug, Deserialize)]
pub struct ReopenBody {
    /// Why the period is reopened.
    pub reason: String,
}

/// GET `/books/{book_id}/fiscal-periods?fiscal_year=&period_no=` - Resolve a period.
async fn resolve_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<BookId>,
    query: Result<Query<ResolvePeriodQuery>, QueryRejection>,
) -> Result<Json<FiscalPeriod>, ApiError> {
    let Query(query) = query?;
    let period = state
        .fiscal_periods()
        .resolve(
            auth.organization_id(),
            book_id,
            query.fiscal_year,
            query.period_no,
            query.is_adjustment,
        )
        .await?;
    Ok(Json(period))
}

/// GET `/books/{book_id}/periods/{period_id}/status` - Get the period status.
async fn get_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, fiscal_period_id)): Path<(BookId, FiscalPeriodId)>,
) -> Result<Json<PeriodStatusResponse>, ApiError> {
    let status = state
        .period_statuses()
        .get(auth.organization_id(), book_id, fiscal_period_id)
        .await?;
    Ok(Json(PeriodStatusResponse {
        book_id,
        fiscal_period_id,
        status,
    }))
}

/// GET `/books/{book_id}/periods/{period_id}/activity` - Per-account activity.
async fn get_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, fiscal_period_id)): Path<(BookId, FiscalPeriodId)>,
) -> Result<Json<PeriodActivityResponse>, ApiError> {
    let activity = state
        .journals()
        .period_activity(auth.organization_id(), book_id, fiscal_period_id)
        .await?;
    Ok(Json(PeriodActivityResponse {
        book_id,
        fiscal_period_id,
        net_income: activity.net_income(),
        accounts: activity.iter().cloned().collect(),
    }))
}

/// POST `/books/{book_id}/periods/{period_id}/close` - Close the period.
///
/// Replaying the latest completed close returns it with `idempotent: true`.
async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, fiscal_period_id)): Path<(BookId, FiscalPeriodId)>,
    payload: Result<Json<CloseRequest>, JsonRejection>,
) -> Result<Json<CloseOutcome>, ApiError> {
    let Json(payload) = payload?;

    let outcome = state
        .close_runs()
        .close_run(CloseRunRequest {
            organization_id: auth.organization_id(),
            book_id,
            fiscal_period_id,
            close_status: payload.close_status,
            retained_earnings_account_id: payload.retained_earnings_account_id,
            note: payload.note,
            requested_by: auth.user_id(),
        })
        .await?;
    Ok(Json(outcome))
}

/// POST `/books/{book_id}/periods/{period_id}/reopen` - Reopen the period.
async fn reopen_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, fiscal_period_id)): Path<(BookId, FiscalPeriodId)>,
    payload: Result<Json<ReopenBody>, JsonRejection>,
) -> Result<Json<ReopenOutcome>, ApiError> {
    let Json(payload) = payload?;

    let outcome = state
        .close_runs()
        .reopen(ReopenRequest {
            organization_id: auth.organization_id(),
            book_id,
            fiscal_period_id,
            reason: payload.reason,
            requested_by: auth.user_id(),
        })
        .await?;
    Ok(Json(outcome))
}

/// GET `/books/{book_id}/periods/{period_id}/close-runs` - Run history.
async fn list_runs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, fiscal_period_id)): Path<(BookId, FiscalPeriodId)>,
) -> Result<Json<Vec<CloseRun>>, ApiError> {
    let runs = state
        .close_runs()
        .list_runs(auth.organization_id(), book_id, fiscal_period_id)
        .await?;
    Ok(Json(runs))
}
