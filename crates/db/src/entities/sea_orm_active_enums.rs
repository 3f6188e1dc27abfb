//! Postgres enum types and their mapping to the domain enums.

use closebook_core::close::CloseRunStatus as CoreCloseRunStatus;
use closebook_core::ledger::{
    AccountType as CoreAccountType, JournalStatus as CoreJournalStatus, Side,
    SourceType as CoreSourceType,
};
use closebook_core::period::{CloseStatus as CoreCloseStatus, PeriodStatus as CorePeriodStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_side")]
pub enum NormalSide {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
pub enum JournalStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_source_type")]
pub enum JournalSourceType {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "integration")]
    Integration,
    #[sea_orm(string_value = "carry_forward")]
    CarryForward,
    #[sea_orm(string_value = "year_end_close")]
    YearEndClose,
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
pub enum PeriodStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "soft_closed")]
    SoftClosed,
    #[sea_orm(string_value = "hard_closed")]
    HardClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "close_status")]
pub enum CloseStatus {
    #[sea_orm(string_value = "soft_closed")]
    SoftClosed,
    #[sea_orm(string_value = "hard_closed")]
    HardClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "close_run_status")]
pub enum CloseRunStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "reopened")]
    Reopened,
}

impl From<AccountType> for CoreAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<CoreAccountType> for AccountType {
    fn from(value: CoreAccountType) -> Self {
        match value {
            CoreAccountType::Asset => Self::Asset,
            CoreAccountType::Liability => Self::Liability,
            CoreAccountType::Equity => Self::Equity,
            CoreAccountType::Revenue => Self::Revenue,
            CoreAccountType::Expense => Self::Expense,
        }
    }
}

impl From<NormalSide> for Side {
    fn from(value: NormalSide) -> Self {
        match value {
            NormalSide::Debit => Self::Debit,
            NormalSide::Credit => Self::Credit,
        }
    }
}

impl From<Side> for NormalSide {
    fn from(value: Side) -> Self {
        match value {
            Side::Debit => Self::Debit,
            Side::Credit => Self::Credit,
        }
    }
}

impl From<JournalStatus> for CoreJournalStatus {
    fn from(value: JournalStatus) -> Self {
        match value {
            JournalStatus::Draft => Self::Draft,
            JournalStatus::Posted => Self::Posted,
            JournalStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<CoreJournalStatus> for JournalStatus {
    fn from(value: CoreJournalStatus) -> Self {
        match value {
            CoreJournalStatus::Draft => Self::Draft,
            CoreJournalStatus::Posted => Self::Posted,
            CoreJournalStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<JournalSourceType> for CoreSourceType {
    fn from(value: JournalSourceType) -> Self {
        match value {
            JournalSourceType::Manual => Self::Manual,
            JournalSourceType::Integration => Self::Integration,
            JournalSourceType::CarryForward => Self::CarryForward,
            JournalSourceType::YearEndClose => Self::YearEndClose,
            JournalSourceType::Reversal => Self::Reversal,
        }
    }
}

impl From<CoreSourceType> for JournalSourceType {
    fn from(value: CoreSourceType) -> Self {
        match value {
            CoreSourceType::Manual => Self::Manual,
            CoreSourceType::Integration => Self::Integration,
            CoreSourceType::CarryForward => Self::CarryForward,
            CoreSourceType::YearEndClose => Self::YearEndClose,
            CoreSourceType::Reversal => Self::Reversal,
        }
    }
}

impl From<PeriodStatus> for CorePeriodStatus {
    fn from(value: PeriodStatus) -> Self {
        match value {
            PeriodStatus::Open => Self::Open,
            PeriodStatus::SoftClosed => Self::SoftClosed,
            PeriodStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl From<CorePeriodStatus> for PeriodStatus {
    fn from(value: CorePeriodStatus) -> Self {
        match value {
            CorePeriodStatus::Open => Self::Open,
            CorePeriodStatus::SoftClosed => Self::SoftClosed,
            CorePeriodStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl From<CloseStatus> for CoreCloseStatus {
    fn from(value: CloseStatus) -> Self {
        match value {
            CloseStatus::SoftClosed => Self::SoftClosed,
            CloseStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl From<CoreCloseStatus> for CloseStatus {
    fn from(value: CoreCloseStatus) -> Self {
        match value {
            CoreCloseStatus::SoftClosed => Self::SoftClosed,
            CoreCloseStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl From<CloseRunStatus> for CoreCloseRunStatus {
    fn from(value: CloseRunStatus) -> Self {
        match value {
            CloseRunStatus::Completed => Self::Completed,
            CloseRunStatus::Reopened => Self::Reopened,
        }
    }
}

impl From<CoreCloseRunStatus> for CloseRunStatus {
    fn from(value: CoreCloseRunStatus) -> Self {
        match value {
            CoreCloseRunStatus::Completed => Self::Completed,
            CoreCloseRunStatus::Reopened => Self::Reopened,
        }
    }
}
