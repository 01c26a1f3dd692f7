//! In-memory store
//!
//! A single mutex guards the whole library. A unit of work holds the lock for
//! its lifetime and mutates a private copy that replaces the shared state on
//! commit, so concurrent units of work are serialized and never observe a
//! partial update.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LibraryStore, LibraryTx};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BorrowedTitleCount, Member},
};

#[derive(Debug, Clone, Default)]
struct LibraryState {
    books: BTreeMap<i64, Book>,
    members: BTreeMap<i64, Member>,
    /// Borrow relationship as (member_id, book_id)
    borrows: BTreeSet<(i64, i64)>,
    last_book_id: i64,
    last_member_id: i64,
}

impl LibraryState {
    fn borrowed_by(&self, member_id: i64) -> impl Iterator<Item = i64> + '_ {
        self.borrows
            .range((member_id, i64::MIN)..=(member_id, i64::MAX))
            .map(|&(_, book_id)| book_id)
    }

    fn borrowed_books(&self) -> impl Iterator<Item = (i64, &Book)> + '_ {
        self.borrows
            .iter()
            .filter_map(move |&(member_id, book_id)| self.books.get(&book_id).map(|b| (member_id, b)))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<LibraryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn LibraryTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            committed: false,
        }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<LibraryState>,
    working: LibraryState,
    committed: bool,
}

impl MemoryTx {
    fn state(&mut self) -> AppResult<&mut LibraryState> {
        if self.committed {
            return Err(AppError::Internal("transaction already committed".to_string()));
        }
        Ok(&mut self.working)
    }
}

#[async_trait]
impl LibraryTx for MemoryTx {
    async fn book_by_id(&mut self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.state()?.books.get(&id).cloned())
    }

    async fn book_by_title_and_author(&mut self, title: &str, author: &str) -> AppResult<Option<Book>> {
        Ok(self
            .state()?
            .books
            .values()
            .find(|b| b.title == title && b.author == author)
            .cloned())
    }

    async fn available_book_by_id(&mut self, id: i64) -> AppResult<Option<Book>> {
        Ok(self
            .state()?
            .books
            .get(&id)
            .filter(|b| b.amount > 0)
            .cloned())
    }

    async fn insert_book(&mut self, title: &str, author: &str, amount: i32) -> AppResult<Book> {
        let state = self.state()?;
        state.last_book_id += 1;
        let book = Book {
            id: state.last_book_id,
            title: title.to_string(),
            author: author.to_string(),
            amount,
        };
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn save_book(&mut self, book: &Book) -> AppResult<()> {
        if book.amount < 0 {
            return Err(AppError::Internal(format!("book {} amount would be negative", book.id)));
        }
        let state = self.state()?;
        match state.books.get_mut(&book.id) {
            Some(stored) => {
                *stored = book.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Book not found".to_string())),
        }
    }

    async fn list_books(&mut self) -> AppResult<Vec<Book>> {
        Ok(self.state()?.books.values().cloned().collect())
    }

    async fn borrowed_titles(&mut self) -> AppResult<Vec<String>> {
        let titles: BTreeSet<String> = self
            .state()?
            .borrowed_books()
            .map(|(_, book)| book.title.clone())
            .collect();
        Ok(titles.into_iter().collect())
    }

    async fn borrowed_title_counts(&mut self) -> AppResult<Vec<BorrowedTitleCount>> {
        let mut borrowers: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();
        for (member_id, book) in self.state()?.borrowed_books() {
            borrowers.entry(book.title.clone()).or_default().insert(member_id);
        }
        Ok(borrowers
            .into_iter()
            .map(|(title, members)| BorrowedTitleCount {
                title,
                borrowers: members.len() as i64,
            })
            .collect())
    }

    async fn book_holders(&mut self, book_id: i64) -> AppResult<Vec<Member>> {
        let state = self.state()?;
        let mut members: Vec<Member> = state
            .borrows
            .iter()
            .filter(|&&(_, b)| b == book_id)
            .filter_map(|(member_id, _)| state.members.get(member_id).cloned())
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    async fn member_by_id(&mut self, id: i64) -> AppResult<Option<Member>> {
        Ok(self.state()?.members.get(&id).cloned())
    }

    async fn member_by_name(&mut self, name: &str) -> AppResult<Option<Member>> {
        Ok(self.state()?.members.values().find(|m| m.name == name).cloned())
    }

    async fn member_name_exists(&mut self, name: &str) -> AppResult<bool> {
        Ok(self.state()?.members.values().any(|m| m.name == name))
    }

    async fn member_has_no_books(&mut self, id: i64) -> AppResult<bool> {
        let state = self.state()?;
        Ok(state.members.contains_key(&id) && state.borrowed_by(id).next().is_none())
    }

    async fn borrow_exists(&mut self, member_id: i64, book_id: i64) -> AppResult<bool> {
        Ok(self.state()?.borrows.contains(&(member_id, book_id)))
    }

    async fn borrowed_book_ids(&mut self, member_id: i64) -> AppResult<Vec<i64>> {
        Ok(self.state()?.borrowed_by(member_id).collect())
    }

    async fn insert_member(&mut self, name: &str, creation_date: NaiveDate) -> AppResult<Member> {
        let state = self.state()?;
        if state.members.values().any(|m| m.name == name) {
            return Err(AppError::AlreadyExists("Member already exists".to_string()));
        }
        state.last_member_id += 1;
        let member = Member {
            id: state.last_member_id,
            name: name.to_string(),
            creation_date,
        };
        state.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn save_member(&mut self, member: &Member) -> AppResult<()> {
        let state = self.state()?;
        if state.members.values().any(|m| m.id != member.id && m.name == member.name) {
            return Err(AppError::AlreadyExists("Member already exists".to_string()));
        }
        match state.members.get_mut(&member.id) {
            Some(stored) => {
                *stored = member.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Member not found".to_string())),
        }
    }

    async fn delete_member(&mut self, id: i64) -> AppResult<()> {
        let state = self.state()?;
        if state.borrowed_by(id).next().is_some() {
            return Err(AppError::HasBooks);
        }
        state.members.remove(&id);
        Ok(())
    }

    async fn list_members(&mut self) -> AppResult<Vec<Member>> {
        Ok(self.state()?.members.values().cloned().collect())
    }

    async fn books_borrowed_by_name(&mut self, name: &str) -> AppResult<Vec<Book>> {
        let state = self.state()?;
        let Some(member) = state.members.values().find(|m| m.name == name) else {
            return Ok(Vec::new());
        };
        Ok(state
            .borrowed_by(member.id)
            .filter_map(|book_id| state.books.get(&book_id).cloned())
            .collect())
    }

    async fn insert_borrow(&mut self, member_id: i64, book_id: i64) -> AppResult<()> {
        let state = self.state()?;
        if !state.members.contains_key(&member_id) {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        if !state.books.contains_key(&book_id) {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        if !state.borrows.insert((member_id, book_id)) {
            return Err(AppError::AlreadyBorrowed);
        }
        Ok(())
    }

    async fn delete_borrow(&mut self, member_id: i64, book_id: i64) -> AppResult<bool> {
        Ok(self.state()?.borrows.remove(&(member_id, book_id)))
    }

    async fn commit(&mut self) -> AppResult<()> {
        let working = std::mem::take(self.state()?);
        *self.guard = working;
        self.committed = true;
        Ok(())
    }
}
