//! Chart of accounts and book reference routes.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use closebook_core::ledger::{AccountInfo, AccountType, Book, Side};
use closebook_shared::types::{AccountId, BookId, CalendarId};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/allow-posting", patch(set_allow_posting))
        .route("/books/{book_id}", get(get_book))
}

/// Request body for toggling posting on an account.
#[derive(Debug, Deserialize)]
pub struct AllowPostingRequest {
    /// New flag value.
    pub allow_posting: bool,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account type.
    pub account_type: AccountType,
    /// Normal balance side.
    pub normal_side: Side,
    /// Whether lines may be posted to the account.
    pub allow_posting: bool,
    /// Parent account ID.
    pub parent_account_id: Option<AccountId>,
}

impl From<AccountInfo> for AccountResponse {
    fn from(account: AccountInfo) -> Self {
        Self {
            id: account.id,
            code: account.code,
            account_type: account.account_type,
            normal_side: account.normal_side,
            allow_posting: account.allow_posting,
            parent_account_id: account.parent_account_id,
        }
    }
}

/// Response for a book.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    /// Book ID.
    pub id: BookId,
    /// Book code.
    pub code: String,
    /// Base currency.
    pub base_currency: String,
    /// Fiscal calendar.
    pub calendar_id: CalendarId,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            code: book.code,
            base_currency: book.base_currency,
            calendar_id: book.calendar_id,
        }
    }
}

/// GET `/accounts/{account_id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .accounts()
        .find(auth.organization_id(), account_id)
        .await?;
    Ok(Json(account.into()))
}

/// PATCH `/accounts/{account_id}/allow-posting` - Toggle posting on an account.
async fn set_allow_posting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
    payload: Result<Json<AllowPostingRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let Json(payload) = payload?;

    let account = state
        .accounts()
        .set_allow_posting(auth.organization_id(), account_id, payload.allow_posting)
        .await?;

    info!(
        account_id = %account_id,
        user_id = %auth.user_id(),
        role = auth.role(),
        allow_posting = payload.allow_posting,
        "Account posting flag changed"
    );
    Ok(Json(account.into()))
}

/// GET `/books/{book_id}` - Get a book.
async fn get_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<BookId>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.books().find(auth.organization_id(), book_id).await?;
    Ok(Json(book.into()))
}
