//! Repository layer: the data-access boundary used by the services
//!
//! Every service operation runs inside one unit of work obtained from
//! [`LibraryStore::begin`]. Writes become visible only through
//! [`LibraryTx::commit`]; a unit of work dropped before commit is rolled back.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::AppResult,
    models::{Book, BorrowedTitleCount, Member},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store handle shared by all services
pub type SharedStore = Arc<dyn LibraryStore>;

/// Entry point to the persistent state
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> AppResult<Box<dyn LibraryTx>>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// One atomic unit of work over books, members and the borrow relationship.
///
/// Rows returned by the `*_by_id` lookups stay locked against other units of
/// work until this one ends.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LibraryTx: Send {
    // Catalog

    async fn book_by_id(&mut self, id: i64) -> AppResult<Option<Book>>;

    async fn book_by_title_and_author(&mut self, title: &str, author: &str) -> AppResult<Option<Book>>;

    /// Book with the given id and at least one copy on the shelf
    async fn available_book_by_id(&mut self, id: i64) -> AppResult<Option<Book>>;

    async fn insert_book(&mut self, title: &str, author: &str, amount: i32) -> AppResult<Book>;

    async fn save_book(&mut self, book: &Book) -> AppResult<()>;

    async fn list_books(&mut self) -> AppResult<Vec<Book>>;

    /// Distinct titles with at least one copy lent out, sorted
    async fn borrowed_titles(&mut self) -> AppResult<Vec<String>>;

    /// Number of distinct members holding each borrowed title, sorted by title
    async fn borrowed_title_counts(&mut self) -> AppResult<Vec<BorrowedTitleCount>>;

    /// Members currently holding the book, sorted by name
    async fn book_holders(&mut self, book_id: i64) -> AppResult<Vec<Member>>;

    // Membership

    async fn member_by_id(&mut self, id: i64) -> AppResult<Option<Member>>;

    async fn member_by_name(&mut self, name: &str) -> AppResult<Option<Member>>;

    async fn member_name_exists(&mut self, name: &str) -> AppResult<bool>;

    /// True when the member exists and holds no book
    async fn member_has_no_books(&mut self, id: i64) -> AppResult<bool>;

    async fn borrow_exists(&mut self, member_id: i64, book_id: i64) -> AppResult<bool>;

    async fn borrowed_book_ids(&mut self, member_id: i64) -> AppResult<Vec<i64>>;

    async fn insert_member(&mut self, name: &str, creation_date: NaiveDate) -> AppResult<Member>;

    async fn save_member(&mut self, member: &Member) -> AppResult<()>;

    async fn delete_member(&mut self, id: i64) -> AppResult<()>;

    async fn list_members(&mut self) -> AppResult<Vec<Member>>;

    async fn books_borrowed_by_name(&mut self, name: &str) -> AppResult<Vec<Book>>;

    async fn insert_borrow(&mut self, member_id: i64, book_id: i64) -> AppResult<()>;

    /// Returns false when the pair was not borrowed
    async fn delete_borrow(&mut self, member_id: i64, book_id: i64) -> AppResult<bool>;

    /// Make every write of this unit of work visible at once
    async fn commit(&mut self) -> AppResult<()>;
}
