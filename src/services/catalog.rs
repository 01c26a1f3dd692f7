//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookPayload},
    repository::SharedStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: SharedStore,
}

impl CatalogService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        let mut tx = self.store.begin().await?;
        let books = tx.list_books().await?;
        tx.commit().await?;
        Ok(books)
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        let mut tx = self.store.begin().await?;
        let book = tx
            .book_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        tx.commit().await?;
        Ok(book)
    }

    /// Register one copy of a title. A known title/author pair gains a copy
    /// instead of getting a second record.
    pub async fn create_book(&self, payload: &BookPayload) -> AppResult<Book> {
        let mut tx = self.store.begin().await?;

        let book = match tx.book_by_title_and_author(&payload.title, &payload.author).await? {
            Some(mut book) => {
                book.amount += 1;
                tx.save_book(&book).await?;
                book
            }
            None => tx.insert_book(&payload.title, &payload.author, 1).await?,
        };
        tx.commit().await?;

        tracing::info!(book_id = book.id, amount = book.amount, "Book copy registered");
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, payload: &BookPayload) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        let mut book = tx
            .book_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        book.title = payload.title.clone();
        book.author = payload.author.clone();
        tx.save_book(&book).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "Book updated");
        Ok(())
    }

    /// Remove one copy from the shelf
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        let mut book = tx
            .book_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        if book.amount <= 0 {
            tracing::debug!(book_id = id, "Delete rejected: no copy left");
            return Err(AppError::BookIsOver);
        }
        book.amount -= 1;
        tx.save_book(&book).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, amount = book.amount, "Book copy removed");
        Ok(())
    }
}
