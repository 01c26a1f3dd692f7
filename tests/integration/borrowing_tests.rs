//! Borrowing invariants under concurrent requests

use std::sync::Arc;

use libris_server::{
    config::LibraryConfig,
    models::{BookPayload, MemberPayload},
    repository::{MemoryStore, SharedStore},
    services::Services,
    AppError,
};

fn services(limit: u32) -> Services {
    let store: SharedStore = Arc::new(MemoryStore::new());
    Services::new(
        store,
        &LibraryConfig {
            max_books_per_member: limit,
        },
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_copy_is_lent_once() {
    let services = services(10);
    let book = services
        .catalog
        .create_book(&BookPayload {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        })
        .await
        .unwrap();

    let mut member_ids = Vec::new();
    for i in 0..8 {
        let member = services
            .members
            .create_member(&MemberPayload {
                name: format!("Member {}", i),
            })
            .await
            .unwrap();
        member_ids.push(member.id);
    }

    let book_id = book.id;
    let handles: Vec<_> = member_ids
        .into_iter()
        .map(|member_id| {
            let borrowing = services.borrowing.clone();
            tokio::spawn(async move { borrowing.borrow(member_id, book_id).await })
        })
        .collect();

    let mut lent = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(book) => {
                assert_eq!(book.amount, 0);
                lent += 1;
            }
            Err(AppError::BookUnavailable) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(lent, 1);
    assert_eq!(services.catalog.get_book(book_id).await.unwrap().amount, 0);
    assert_eq!(services.stats.book_holders(book_id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_respect_limit() {
    let services = services(3);
    let member = services
        .members
        .create_member(&MemberPayload {
            name: "John".to_string(),
        })
        .await
        .unwrap();

    let mut book_ids = Vec::new();
    for title in ["Dune", "Emma", "Ulysses", "Beloved", "Middlemarch", "Persuasion"] {
        let book = services
            .catalog
            .create_book(&BookPayload {
                title: title.to_string(),
                author: "Some Author".to_string(),
            })
            .await
            .unwrap();
        book_ids.push(book.id);
    }

    let member_id = member.id;
    let handles: Vec<_> = book_ids
        .iter()
        .map(|&book_id| {
            let borrowing = services.borrowing.clone();
            tokio::spawn(async move { borrowing.borrow(member_id, book_id).await })
        })
        .collect();

    let mut lent = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => lent += 1,
            Err(AppError::LimitReached { limit }) => {
                assert_eq!(limit, 3);
                refused += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!((lent, refused), (3, 3));
    assert_eq!(services.stats.books_borrowed_by("John").await.unwrap().len(), 3);

    let mut total = 0;
    for book_id in book_ids {
        total += services.catalog.get_book(book_id).await.unwrap().amount;
    }
    assert_eq!(total, 3);
}
