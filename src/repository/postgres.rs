//! PostgreSQL-backed store

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres, Transaction};

use super::{LibraryStore, LibraryTx};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BorrowedTitleCount, Member},
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryStore for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn LibraryTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx: Some(tx) }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Unit of work over one database transaction
pub struct PgTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTx {
    fn conn(&mut self) -> AppResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::Internal("transaction already committed".to_string()))
    }
}

/// Map a unique-key violation to a business error, anything else to a database error
fn on_unique_violation(err: sqlx::Error, conflict: AppError) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict,
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl LibraryTx for PgTx {
    async fn book_by_id(&mut self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(book)
    }

    async fn book_by_title_and_author(&mut self, title: &str, author: &str) -> AppResult<Option<Book>> {
        // Row locks cannot cover a pair that has no row yet; the transaction-scoped
        // advisory lock serializes registrations of the same pair until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
            .bind(title)
            .bind(author)
            .execute(self.conn()?)
            .await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE title = $1 AND author = $2 ORDER BY id LIMIT 1 FOR UPDATE",
        )
        .bind(title)
        .bind(author)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(book)
    }

    async fn available_book_by_id(&mut self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id = $1 AND amount > 0 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(book)
    }

    async fn insert_book(&mut self, title: &str, author: &str, amount: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, author, amount) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(title)
        .bind(author)
        .bind(amount)
        .fetch_one(self.conn()?)
        .await
        .map_err(Into::into)
    }

    async fn save_book(&mut self, book: &Book) -> AppResult<()> {
        sqlx::query("UPDATE books SET title = $1, author = $2, amount = $3 WHERE id = $4")
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.amount)
            .bind(book.id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn list_books(&mut self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(self.conn()?)
            .await?;
        Ok(books)
    }

    async fn borrowed_titles(&mut self) -> AppResult<Vec<String>> {
        let titles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT b.title
            FROM books b
            JOIN member_books mb ON mb.book_id = b.id
            ORDER BY b.title
            "#,
        )
        .fetch_all(self.conn()?)
        .await?;
        Ok(titles)
    }

    async fn borrowed_title_counts(&mut self) -> AppResult<Vec<BorrowedTitleCount>> {
        let counts = sqlx::query_as::<_, BorrowedTitleCount>(
            r#"
            SELECT b.title, COUNT(DISTINCT mb.member_id) AS borrowers
            FROM books b
            JOIN member_books mb ON mb.book_id = b.id
            GROUP BY b.title
            ORDER BY b.title
            "#,
        )
        .fetch_all(self.conn()?)
        .await?;
        Ok(counts)
    }

    async fn book_holders(&mut self, book_id: i64) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT m.*
            FROM members m
            JOIN member_books mb ON mb.member_id = m.id
            WHERE mb.book_id = $1
            ORDER BY m.name
            "#,
        )
        .bind(book_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(members)
    }

    async fn member_by_id(&mut self, id: i64) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(member)
    }

    async fn member_by_name(&mut self, name: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE name = $1")
            .bind(name)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(member)
    }

    async fn member_name_exists(&mut self, name: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE name = $1)")
            .bind(name)
            .fetch_one(self.conn()?)
            .await?;
        Ok(exists)
    }

    async fn member_has_no_books(&mut self, id: i64) -> AppResult<bool> {
        let empty: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM members m
                WHERE m.id = $1
                  AND NOT EXISTS (SELECT 1 FROM member_books mb WHERE mb.member_id = m.id)
            )
            "#,
        )
        .bind(id)
        .fetch_one(self.conn()?)
        .await?;
        Ok(empty)
    }

    async fn borrow_exists(&mut self, member_id: i64, book_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM member_books WHERE member_id = $1 AND book_id = $2)",
        )
        .bind(member_id)
        .bind(book_id)
        .fetch_one(self.conn()?)
        .await?;
        Ok(exists)
    }

    async fn borrowed_book_ids(&mut self, member_id: i64) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT book_id FROM member_books WHERE member_id = $1 ORDER BY book_id",
        )
        .bind(member_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(ids)
    }

    async fn insert_member(&mut self, name: &str, creation_date: NaiveDate) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "INSERT INTO members (name, creation_date) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(creation_date)
        .fetch_one(self.conn()?)
        .await
        .map_err(|e| on_unique_violation(e, AppError::AlreadyExists("Member already exists".to_string())))
    }

    async fn save_member(&mut self, member: &Member) -> AppResult<()> {
        sqlx::query("UPDATE members SET name = $1 WHERE id = $2")
            .bind(&member.name)
            .bind(member.id)
            .execute(self.conn()?)
            .await
            .map_err(|e| on_unique_violation(e, AppError::AlreadyExists("Member already exists".to_string())))?;
        Ok(())
    }

    async fn delete_member(&mut self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn list_members(&mut self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY id")
            .fetch_all(self.conn()?)
            .await?;
        Ok(members)
    }

    async fn books_borrowed_by_name(&mut self, name: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.*
            FROM books b
            JOIN member_books mb ON mb.book_id = b.id
            JOIN members m ON m.id = mb.member_id
            WHERE m.name = $1
            ORDER BY mb.borrowed_at, b.id
            "#,
        )
        .bind(name)
        .fetch_all(self.conn()?)
        .await?;
        Ok(books)
    }

    async fn insert_borrow(&mut self, member_id: i64, book_id: i64) -> AppResult<()> {
        sqlx::query("INSERT INTO member_books (member_id, book_id) VALUES ($1, $2)")
            .bind(member_id)
            .bind(book_id)
            .execute(self.conn()?)
            .await
            .map_err(|e| on_unique_violation(e, AppError::AlreadyBorrowed))?;
        Ok(())
    }

    async fn delete_borrow(&mut self, member_id: i64, book_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM member_books WHERE member_id = $1 AND book_id = $2")
            .bind(member_id)
            .bind(book_id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(&mut self) -> AppResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(AppError::Internal("transaction already committed".to_string())),
        }
    }
}
