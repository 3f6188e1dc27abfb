//! Journal posting routes.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, middleware::AuthUser};
use closebook_core::ledger::{
    JournalEntry, JournalLineInput, JournalStatus, LineAmount, PostJournalInput,
    ReversalContext, Side, SourceType,
};
use closebook_shared::types::{
    AccountId, BookId, FiscalPeriodId, JournalEntryId, JournalLineId, OrganizationId,
};

/// Creates the journal routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/{book_id}/journals", post(post_journal))
        .route("/books/{book_id}/journals/drafts", post(save_draft))
        .route("/journals/{journal_id}", get(get_journal))
        .route("/journals/{journal_id}/post", post(post_draft))
        .route("/journals/{journal_id}/reverse", post(reverse_journal))
}

const fn default_source_type() -> SourceType {
    SourceType::Manual
}

/// Request body for posting or drafting a journal.
#[derive(Debug, Deserialize)]
pub struct JournalRequest {
    /// Target fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Document date, defaults to the entry date.
    pub document_date: Option<NaiveDate>,
    /// Header currency.
    pub currency_code: String,
    /// MANUAL (default) or INTEGRATION.
    #[serde(default = "default_source_type")]
    pub source_type: SourceType,
    /// Description.
    pub description: String,
    /// Lines in posting order.
    pub lines: Vec<JournalLineRequest>,
}

/// One line of a journal request.
#[derive(Debug, Deserialize)]
pub struct JournalLineRequest {
    /// Account to post to.
    pub account_id: AccountId,
    /// DEBIT or CREDIT.
    pub side: Side,
    /// Base-currency amount.
    pub amount: Decimal,
    /// Transaction-currency amount, defaults to `amount`.
    pub amount_txn: Option<Decimal>,
    /// Transaction currency, defaults to the header currency.
    pub currency_code: Option<String>,
    /// Line description.
    pub description: Option<String>,
}

impl JournalRequest {
    fn into_input(
        self,
        organization_id: OrganizationId,
        book_id: BookId,
        auth: &AuthUser,
    ) -> Result<PostJournalInput, ApiError> {
        if self.source_type.is_system_generated() {
            return Err(ApiError::validation(
                "SOURCE_TYPE_RESERVED",
                format!("Source type {:?} is reserved for generated journals", self.source_type),
            ));
        }

        let lines = self
            .lines
            .into_iter()
            .map(|line| {
                let currency = line.currency_code.as_deref().unwrap_or(&self.currency_code);
                JournalLineInput {
                    account_id: line.account_id,
                    amount: LineAmount::new(
                        line.side,
                        currency,
                        line.amount_txn.unwrap_or(line.amount),
                        line.amount,
                    ),
                    description: line.description,
                }
            })
            .collect();

        Ok(PostJournalInput {
            organization_id,
            book_id,
            fiscal_period_id: self.fiscal_period_id,
            entry_date: self.entry_date,
            document_date: self.document_date.unwrap_or(self.entry_date),
            currency_code: self.currency_code,
            source_type: self.source_type,
            description: self.description,
            lines,
            created_by: auth.user_id(),
        })
    }
}

/// Request body for reversing a journal.
#[derive(Debug, Default, Deserialize)]
pub struct ReverseRequest {
    /// Period to post the reversal into, defaults to the original's.
    pub fiscal_period_id: Option<FiscalPeriodId>,
    /// Accounting date, defaults to the original's.
    pub entry_date: Option<NaiveDate>,
    /// Overrides the default description.
    pub description: Option<String>,
}

/// Response for a journal entry.
#[derive(Debug, Serialize)]
pub struct JournalResponse {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Header currency.
    pub currency_code: String,
    /// Origin.
    pub source_type: SourceType,
    /// Description.
    pub description: String,
    /// DRAFT, POSTED or REVERSED.
    pub status: JournalStatus,
    /// Entry this one reverses.
    pub reverses_entry_id: Option<JournalEntryId>,
    /// Base debit total.
    pub total_debit: Decimal,
    /// Base credit total.
    pub total_credit: Decimal,
    /// Lines in order.
    pub lines: Vec<JournalLineResponse>,
}

/// Response for a journal line.
#[derive(Debug, Serialize)]
pub struct JournalLineResponse {
    /// Line ID.
    pub id: JournalLineId,
    /// 1-based position.
    pub line_no: i32,
    /// Account.
    pub account_id: AccountId,
    /// Transaction currency.
    pub currency_code: String,
    /// Transaction-currency amount.
    pub amount_txn: Decimal,
    /// Base debit.
    pub debit_base: Decimal,
    /// Base credit.
    pub credit_base: Decimal,
    /// Line description.
    pub description: Option<String>,
}

impl From<JournalEntry> for JournalResponse {
    fn from(entry: JournalEntry) -> Self {
        let (total_debit, total_credit) = entry.lines.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(debit, credit), line| {
                (debit + line.amount.debit_base, credit + line.amount.credit_base)
            },
        );

        Self {
            id: entry.id,
            book_id: entry.book_id,
            fiscal_period_id: entry.fiscal_period_id,
            entry_date: entry.entry_date,
            currency_code: entry.currency_code,
            source_type: entry.source_type,
            description: entry.description,
            status: entry.status,
            reverses_entry_id: entry.reverses_entry_id,
            total_debit,
            total_credit,
            lines: entry
                .lines
                .into_iter()
                .map(|line| JournalLineResponse {
                    id: line.id,
                    line_no: line.line_no,
                    account_id: line.account_id,
                    currency_code: line.amount.currency_code,
                    amount_txn: line.amount.amount_txn,
                    debit_base: line.amount.debit_base,
                    credit_base: line.amount.credit_base,
                    description: line.description,
                })
                .collect(),
        }
    }
}

/// POST `/books/{book_id}/journals` - Post a journal.
async fn post_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<BookId>,
    payload: Result<Json<JournalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JournalResponse>), ApiError> {
    let Json(payload) = payload?;
    let input = payload.into_input(auth.organization_id(), book_id, &auth)?;

    let entry = state.journals().post(input).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// POST `/books/{book_id}/journals/drafts` - Save a draft journal.
async fn save_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<BookId>,
    payload: Result<Json<JournalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JournalResponse>), ApiError> {
    let Json(payload) = payload?;
    let input = payload.into_input(auth.organization_id(), book_id, &auth)?;

    let entry = state.journals().save_draft(input).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// POST `/journals/{journal_id}/post` - Post a draft.
async fn post_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(journal_id): Path<JournalEntryId>,
) -> Result<Json<JournalResponse>, ApiError> {
    let entry = state
        .journals()
        .post_draft(auth.organization_id(), journal_id)
        .await?;
    Ok(Json(entry.into()))
}

/// GET `/journals/{journal_id}` - Get a journal with its lines.
async fn get_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(journal_id): Path<JournalEntryId>,
) -> Result<Json<JournalResponse>, ApiError> {
    let entry = state
        .journals()
        .get(auth.organization_id(), journal_id)
        .await?;
    Ok(Json(entry.into()))
}

/// POST `/journals/{journal_id}/reverse` - Reverse a posted journal.
async fn reverse_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(journal_id): Path<JournalEntryId>,
    payload: Option<Json<ReverseRequest>>,
) -> Result<(StatusCode, Json<JournalResponse>), ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let journals = state.journals();

    let (fiscal_period_id, entry_date) = match (request.fiscal_period_id, request.entry_date) {
        (Some(period), Some(date)) => (period, date),
        (period, date) => {
            let original = journals.get(auth.organization_id(), journal_id).await?;
            (
                period.unwrap_or(original.fiscal_period_id),
                date.unwrap_or(original.entry_date),
            )
        }
    };

    let ctx = ReversalContext {
        fiscal_period_id,
        entry_date,
        description: request.description,
        created_by: auth.user_id(),
    };
    let entry = journals
        .reverse(auth.organization_id(), journal_id, &ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}
