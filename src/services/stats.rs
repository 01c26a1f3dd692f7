//! Read-only projections over the borrow relationship

use crate::{
    error::{AppError, AppResult},
    models::{Book, BorrowedTitleCount, Member},
    repository::SharedStore,
};

#[derive(Clone)]
pub struct StatsService {
    store: SharedStore,
}

impl StatsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Distinct titles currently lent out
    pub async fn borrowed_titles(&self) -> AppResult<Vec<String>> {
        let mut tx = self.store.begin().await?;
        let titles = tx.borrowed_titles().await?;
        tx.commit().await?;
        Ok(titles)
    }

    /// Borrowed titles with the number of distinct members holding them
    pub async fn borrowed_title_counts(&self) -> AppResult<Vec<BorrowedTitleCount>> {
        let mut tx = self.store.begin().await?;
        let counts = tx.borrowed_title_counts().await?;
        tx.commit().await?;
        Ok(counts)
    }

    pub async fn books_borrowed_by(&self, name: &str) -> AppResult<Vec<Book>> {
        let mut tx = self.store.begin().await?;
        tx.member_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound("Member by name not found".to_string()))?;
        let books = tx.books_borrowed_by_name(name).await?;
        tx.commit().await?;
        Ok(books)
    }

    /// Members currently holding a copy of the book
    pub async fn book_holders(&self, book_id: i64) -> AppResult<Vec<Member>> {
        let mut tx = self.store.begin().await?;
        tx.book_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        let members = tx.book_holders(book_id).await?;
        tx.commit().await?;
        Ok(members)
    }
}
