//! Shared fixtures for database integration tests.
//!
//! Tests run against `DATABASE_URL` and return early when it is unset. Every
//! fixture creates its own organization, calendar and book, so tests never
//! see each other's rows.

#![allow(dead_code)]

use std::env;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tokio::sync::OnceCell;
use uuid::Uuid;

use closebook_core::close::{CloseRunRequest, ReopenRequest};
use closebook_core::ledger::{JournalLineInput, LineAmount, PostJournalInput, Side, SourceType};
use closebook_core::period::CloseStatus;
use closebook_db::entities::{
    books, chart_of_accounts, fiscal_calendars, fiscal_periods,
    sea_orm_active_enums::{AccountType, NormalSide},
};
use closebook_db::migration::Migrator;
use closebook_db::{CloseRunRepository, JournalRepository};
use closebook_shared::types::{AccountId, BookId, FiscalPeriodId, OrganizationId, UserId};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    let db = Database::connect(&url).await.expect("connect to DATABASE_URL");
    let conn = &db;
    MIGRATED
        .get_or_init(|| async move {
            Migrator::up(conn, None).await.expect("run migrations");
        })
        .await;
    Some(db)
}

/// One tenant with a book, two March/April periods and a small chart.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub march: FiscalPeriodId,
    pub april: FiscalPeriodId,
    /// Period of an unrelated calendar.
    pub foreign_period: FiscalPeriodId,
    pub cash: AccountId,
    pub payable: AccountId,
    pub revenue: AccountId,
    pub expense: AccountId,
    pub retained_earnings: AccountId,
    /// Non-postable parent of `cash`.
    pub current_assets: AccountId,
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn insert_calendar(db: &DatabaseConnection, organization_id: Uuid) -> Uuid {
    let id = Uuid::now_v7();
    fiscal_calendars::ActiveModel {
        id: Set(id),
        organization_id: Set(organization_id),
        name: Set(format!("Calendar {id}")),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

async fn insert_period(
    db: &DatabaseConnection,
    calendar_id: Uuid,
    period_no: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> FiscalPeriodId {
    let id = Uuid::now_v7();
    fiscal_periods::ActiveModel {
        id: Set(id),
        calendar_id: Set(calendar_id),
        fiscal_year: Set(2026),
        period_no: Set(period_no),
        is_adjustment: Set(false),
        start_date: Set(start),
        end_date: Set(end),
    }
    .insert(db)
    .await
    .unwrap();
    FiscalPeriodId::from_uuid(id)
}

async fn insert_account(
    db: &DatabaseConnection,
    organization_id: Uuid,
    code: &str,
    account_type: AccountType,
    normal_side: NormalSide,
    allow_posting: bool,
    parent: Option<AccountId>,
) -> AccountId {
    let id = Uuid::now_v7();
    let now = Utc::now();
    chart_of_accounts::ActiveModel {
        id: Set(id),
        organization_id: Set(organization_id),
        code: Set(code.to_string()),
        name: Set(format!("Account {code}")),
        account_type: Set(account_type),
        normal_side: Set(normal_side),
        allow_posting: Set(allow_posting),
        parent_account_id: Set(parent.map(AccountId::into_inner)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .unwrap();
    AccountId::from_uuid(id)
}

/// Builds a fresh tenant, or `None` when no database is configured.
pub async fn fixture() -> Option<Fixture> {
    let db = connect().await?;
    let org = Uuid::now_v7();

    let calendar_id = insert_calendar(&db, org).await;
    let book_id = Uuid::now_v7();
    books::ActiveModel {
        id: Set(book_id),
        organization_id: Set(org),
        code: Set("LOCAL".into()),
        name: Set("Local GAAP".into()),
        base_currency: Set("USD".into()),
        calendar_id: Set(calendar_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await
    .unwrap();

    let march = insert_period(&db, calendar_id, 3, date(2026, 3, 1), date(2026, 3, 31)).await;
    let april = insert_period(&db, calendar_id, 4, date(2026, 4, 1), date(2026, 4, 30)).await;
    let other_calendar = insert_calendar(&db, org).await;
    let foreign_period =
        insert_period(&db, other_calendar, 3, date(2026, 3, 1), date(2026, 3, 31)).await;

    let current_assets = insert_account(
        &db,
        org,
        "1000",
        AccountType::Asset,
        NormalSide::Debit,
        false,
        None,
    )
    .await;
    let cash = insert_account(
        &db,
        org,
        "1010",
        AccountType::Asset,
        NormalSide::Debit,
        true,
        Some(current_assets),
    )
    .await;
    let payable = insert_account(
        &db,
        org,
        "2000",
        AccountType::Liability,
        NormalSide::Credit,
        true,
        None,
    )
    .await;
    let retained_earnings = insert_account(
        &db,
        org,
        "3100",
        AccountType::Equity,
        NormalSide::Credit,
        true,
        None,
    )
    .await;
    let revenue = insert_account(
        &db,
        org,
        "4000",
        AccountType::Revenue,
        NormalSide::Credit,
        true,
        None,
    )
    .await;
    let expense = insert_account(
        &db,
        org,
        "5000",
        AccountType::Expense,
        NormalSide::Debit,
        true,
        None,
    )
    .await;

    Some(Fixture {
        db,
        organization_id: OrganizationId::from_uuid(org),
        user_id: UserId::new(),
        book_id: BookId::from_uuid(book_id),
        march,
        april,
        foreign_period,
        cash,
        payable,
        revenue,
        expense,
        retained_earnings,
        current_assets,
    })
}

impl Fixture {
    pub fn journals(&self) -> JournalRepository {
        JournalRepository::new(self.db.clone()).with_lock_timeout(2_000)
    }

    pub fn close_runs(&self) -> CloseRunRepository {
        CloseRunRepository::new(self.db.clone()).with_lock_timeout(2_000)
    }

    /// A manual journal in `period` dated `entry_date`.
    pub fn journal(
        &self,
        period: FiscalPeriodId,
        entry_date: NaiveDate,
        lines: &[(AccountId, Side, Decimal)],
    ) -> PostJournalInput {
        PostJournalInput {
            organization_id: self.organization_id,
            book_id: self.book_id,
            fiscal_period_id: period,
            entry_date,
            document_date: entry_date,
            currency_code: "USD".into(),
            source_type: SourceType::Manual,
            description: "Test journal".into(),
            lines: lines
                .iter()
                .map(|(account_id, side, amount)| JournalLineInput {
                    account_id: *account_id,
                    amount: LineAmount::in_base(*side, "USD", *amount),
                    description: None,
                })
                .collect(),
            created_by: self.user_id,
        }
    }

    /// A balanced two-line March journal.
    pub fn simple(&self, debit: AccountId, credit: AccountId, amount: Decimal) -> PostJournalInput {
        self.journal(
            self.march,
            date(2026, 3, 15),
            &[(debit, Side::Debit, amount), (credit, Side::Credit, amount)],
        )
    }

    pub fn close_request(&self, close_status: CloseStatus) -> CloseRunRequest {
        CloseRunRequest {
            organization_id: self.organization_id,
            book_id: self.book_id,
            fiscal_period_id: self.march,
            close_status,
            retained_earnings_account_id: self.retained_earnings,
            note: Some("March close".into()),
            requested_by: self.user_id,
        }
    }

    pub fn reopen_request(&self, reason: &str) -> ReopenRequest {
        ReopenRequest {
            organization_id: self.organization_id,
            book_id: self.book_id,
            fiscal_period_id: self.march,
            reason: reason.into(),
            requested_by: self.user_id,
        }
    }
}
