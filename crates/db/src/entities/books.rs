//! `SeaORM` Entity for ledger books.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub code: String,
    pub name: String,
    pub base_currency: String,
    pub calendar_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fiscal_calendars::Entity",
        from = "Column::CalendarId",
        to = "super::fiscal_calendars::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    FiscalCalendars,
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
    #[sea_orm(has_many = "super::period_statuses::Entity")]
    PeriodStatuses,
    #[sea_orm(has_many = "super::period_close_runs::Entity")]
    PeriodCloseRuns,
}

impl Related<super::fiscal_calendars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalCalendars.def()
    }
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::period_statuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PeriodStatuses.def()
    }
}

impl Related<super::period_close_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PeriodCloseRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
