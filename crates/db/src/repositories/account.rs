//! Account repository for chart of accounts lookups.
//!
//! The chart itself is maintained elsewhere; this service reads accounts for
//! posting and owns only the `allow_posting` toggle.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use closebook_core::ledger::{AccountInfo, LedgerError, LedgerService};
use closebook_shared::types::{AccountId, OrganizationId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::chart_of_accounts;
use crate::error::ledger_error;

/// Access to the chart of accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an account of the organization.
    pub async fn find(
        &self,
        organization_id: OrganizationId,
        account_id: AccountId,
    ) -> Result<AccountInfo, LedgerError> {
        load_accounts(&self.db, organization_id, [account_id])
            .await?
            .remove(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Toggles whether the account accepts journal lines.
    ///
    /// Enabling posting on an account with children is rejected; header
    /// accounts stay non-postable.
    pub async fn set_allow_posting(
        &self,
        organization_id: OrganizationId,
        account_id: AccountId,
        allow_posting: bool,
    ) -> Result<AccountInfo, LedgerError> {
        let txn = self.db.begin().await.map_err(ledger_error)?;

        let model = chart_of_accounts::Entity::find_by_id(account_id.into_inner())
            .filter(chart_of_accounts::Column::OrganizationId.eq(organization_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ledger_error)?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let account = to_account_info(&model);

        let child_count = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::ParentAccountId.eq(account_id.into_inner()))
            .count(&txn)
            .await
            .map_err(ledger_error)?;

        LedgerService::validate_allow_posting_change(&account, allow_posting, child_count)?;

        if account.allow_posting == allow_posting {
            txn.commit().await.map_err(ledger_error)?;
            return Ok(account);
        }

        let mut active: chart_of_accounts::ActiveModel = model.into();
        active.allow_posting = Set(allow_posting);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(ledger_error)?;

        txn.commit().await.map_err(ledger_error)?;

        tracing::info!(
            account_id = %account_id,
            allow_posting,
            "Account posting flag changed"
        );

        Ok(to_account_info(&updated))
    }
}

/// Loads the organization's accounts among `ids`; unknown ids are absent from the map.
pub(crate) async fn load_accounts<C, I>(
    conn: &C,
    organization_id: OrganizationId,
    ids: I,
) -> Result<HashMap<AccountId, AccountInfo>, LedgerError>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = AccountId>,
{
    let ids: Vec<Uuid> = ids
        .into_iter()
        .map(AccountId::into_inner)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = chart_of_accounts::Entity::find()
        .filter(chart_of_accounts::Column::Id.is_in(ids))
        .filter(chart_of_accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .all(conn)
        .await
        .map_err(ledger_error)?;

    Ok(models
        .iter()
        .map(|m| (AccountId::from_uuid(m.id), to_account_info(m)))
        .collect())
}

fn to_account_info(model: &chart_of_accounts::Model) -> AccountInfo {
    AccountInfo {
        id: AccountId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        code: model.code.clone(),
        account_type: model.account_type.into(),
        normal_side: model.normal_side.into(),
        allow_posting: model.allow_posting,
        parent_account_id: model.parent_account_id.map(AccountId::from_uuid),
    }
}
