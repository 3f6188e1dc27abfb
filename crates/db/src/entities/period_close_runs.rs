//! `SeaORM` Entity for the close run log.

use super::sea_orm_active_enums::{CloseRunStatus, CloseStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "period_close_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub book_id: Uuid,
    pub fiscal_period_id: Uuid,
    pub generation: i32,
    pub requested_close_status: CloseStatus,
    pub carry_forward_journal_entry_id: Option<Uuid>,
    pub year_end_journal_entry_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub net_income: Decimal,
    pub status: CloseRunStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub reopened_by: Option<Uuid>,
    pub reopened_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reopen_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::books::Entity",
        from = "Column::BookId",
        to = "super::books::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Books,
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::CarryForwardJournalEntryId",
        to = "super::journal_entries::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    CarryForwardJournal,
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::YearEndJournalEntryId",
        to = "super::journal_entries::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    YearEndJournal,
}

impl Related<super::books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Books.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
