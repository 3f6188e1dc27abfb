//! `SeaORM` Entity for fiscal periods.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub fiscal_year: i32,
    pub period_no: i32,
    pub is_adjustment: bool,
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fiscal_calendars::Entity",
        from = "Column::CalendarId",
        to = "super::fiscal_calendars::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FiscalCalendars,
}

impl Related<super::fiscal_calendars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalCalendars.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
