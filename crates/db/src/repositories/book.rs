//! Book lookups.
//!
//! Books are maintained outside this service; every lookup is scoped by
//! organization so a book of another tenant reads as not found.

use closebook_core::ledger::{Book, LedgerError};
use closebook_shared::types::{BookId, CalendarId, OrganizationId};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::books;
use crate::error::ledger_error;

/// Read access to ledger books.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: DatabaseConnection,
}

impl BookRepository {
    /// Creates a new book repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a book of the organization.
    pub async fn find(
        &self,
        organization_id: OrganizationId,
        book_id: BookId,
    ) -> Result<Book, LedgerError> {
        load_book(&self.db, organization_id, book_id).await
    }
}

pub(crate) async fn load_book<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    book_id: BookId,
) -> Result<Book, LedgerError> {
    books::Entity::find_by_id(book_id.into_inner())
        .filter(books::Column::OrganizationId.eq(organization_id.into_inner()))
        .one(conn)
        .await
        .map_err(ledger_error)?
        .map(to_book)
        .ok_or(LedgerError::BookNotFound(book_id))
}

fn to_book(model: books::Model) -> Book {
    Book {
        id: BookId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        code: model.code,
        base_currency: model.base_currency.trim().to_string(),
        calendar_id: CalendarId::from_uuid(model.calendar_id),
    }
}
