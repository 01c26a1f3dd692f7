//! Borrow and return of books by members
//!
//! Both operations run in one unit of work: the precondition checks, the
//! book amount update and the borrow relationship update are committed
//! together or not at all.

use crate::{
    error::{AppError, AppResult},
    models::Book,
    repository::SharedStore,
};

#[derive(Clone)]
pub struct BorrowingService {
    store: SharedStore,
    max_books_per_member: u32,
}

impl BorrowingService {
    pub fn new(store: SharedStore, max_books_per_member: u32) -> Self {
        Self {
            store,
            max_books_per_member,
        }
    }

    /// Lend one copy of a book to a member and return the book with its new amount.
    ///
    /// Checks run in a fixed order and the first failing one decides the error:
    /// already borrowed, member missing, limit reached, book missing or out of stock.
    pub async fn borrow(&self, member_id: i64, book_id: i64) -> AppResult<Book> {
        let mut tx = self.store.begin().await?;

        if tx.borrow_exists(member_id, book_id).await? {
            tracing::debug!(member_id, book_id, "Borrow rejected: book already held");
            return Err(AppError::AlreadyBorrowed);
        }

        let member = tx
            .member_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let held = tx.borrowed_book_ids(member.id).await?.len();
        if held >= self.max_books_per_member as usize {
            tracing::debug!(member_id, held, "Borrow rejected: limit reached");
            return Err(AppError::LimitReached {
                limit: self.max_books_per_member,
            });
        }

        let mut book = tx
            .available_book_by_id(book_id)
            .await?
            .ok_or(AppError::BookUnavailable)?;

        book.amount -= 1;
        tx.save_book(&book).await?;
        tx.insert_borrow(member.id, book.id).await?;
        tx.commit().await?;

        tracing::info!(member_id, book_id, amount = book.amount, "Book borrowed");
        Ok(book)
    }

    /// Take a copy back from a member
    pub async fn return_book(&self, member_id: i64, book_id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        let member = tx
            .member_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let mut book = tx
            .book_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        book.amount += 1;
        tx.save_book(&book).await?;
        if !tx.delete_borrow(member.id, book.id).await? {
            tracing::warn!(member_id, book_id, "Book returned without an open borrow");
        }
        tx.commit().await?;

        tracing::info!(member_id, book_id, amount = book.amount, "Book returned");
        Ok(())
    }
}
