//! API integration tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{app, send};

#[tokio::test]
async fn test_health_check() {
    let app = app(10);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_book_twice() {
    let app = app(10);
    let java = json!({ "title": "Effective Java", "author": "Joshua Bloch" });

    let (status, body) = send(&app, "POST", "/books", Some(java.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "title": "Effective Java", "author": "Joshua Bloch", "amount": 1 }));

    let (status, body) = send(&app, "POST", "/books", Some(java)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"], 2);

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_book_reports_all_violations() {
    let app = app(10);

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": "ab", "author": "joshua" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let details: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(details.len(), 3);
    assert!(details.contains(&"Author must contain a capitalized name and surname"));
    assert!(details.contains(&"Title must be at least 3 characters long"));
    assert!(details.contains(&"Title must start with a capital letter"));
}

#[tokio::test]
async fn test_malformed_book_body_is_a_bad_value() {
    let app = app(10);

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": null, "author": "Joshua Bloch" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["details"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "PUT", "/members/1", Some(json!({ "name": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_update_book_onto_existing_title_and_author() {
    let app = app(10);
    send(&app, "POST", "/books", Some(json!({ "title": "Dune", "author": "Frank Herbert" }))).await;
    send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": "Dune Messiah", "author": "Frank Herbert" })),
    )
    .await;

    let (status, _) = send(
        &app,
        "PUT",
        "/books/2",
        Some(json!({ "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/books/2", None).await;
    assert_eq!(body["title"], "Dune");
}

#[tokio::test]
async fn test_get_update_delete_book() {
    let app = app(10);
    send(&app, "POST", "/books", Some(json!({ "title": "Dune", "author": "Frank Herbert" }))).await;

    let (status, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Dune");

    let (status, _) = send(&app, "GET", "/books/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/books/1",
        Some(json!({ "title": "Dune Messiah", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "PUT", "/books/1", Some(json!({ "title": "x", "author": "y" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/books/9",
        Some(json!({ "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "This book amount is over");

    let (status, _) = send(&app, "DELETE", "/books/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_lifecycle() {
    let app = app(10);

    let (status, body) = send(&app, "POST", "/members", Some(json!({ "name": "John" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "John");
    assert!(body["creationDate"].is_string());

    let (status, body) = send(&app, "POST", "/members", Some(json!({ "name": "John" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Member already exists");

    let (status, _) = send(&app, "POST", "/members", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app, "POST", "/members", Some(json!({ "name": "Anna" }))).await;

    let (status, _) = send(&app, "PUT", "/members/1", Some(json!({ "name": "Anna" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", "/members/1", Some(json!({ "name": "Johnny" }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/members/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Johnny");

    let (status, _) = send(&app, "PUT", "/members/9", Some(json!({ "name": "Bob" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/members", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "DELETE", "/members/2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/members/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_borrow_and_return_flow() {
    let app = app(10);
    send(&app, "POST", "/books", Some(json!({ "title": "Title", "author": "Some Author" }))).await;
    send(&app, "POST", "/members", Some(json!({ "name": "John" }))).await;

    let (status, body) = send(&app, "POST", "/members/1/books/1", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "title": "Title", "author": "Some Author", "amount": 0 }));

    let (status, body) = send(&app, "POST", "/members/1/books/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "AlreadyBorrowed");

    let (_, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(body["amount"], 0);

    let (_, body) = send(&app, "GET", "/books/borrowed", None).await;
    assert_eq!(body, json!(["Title"]));

    let (_, body) = send(&app, "GET", "/books/borrowed/counts", None).await;
    assert_eq!(body, json!([{ "title": "Title", "borrowers": 1 }]));

    let (_, body) = send(&app, "GET", "/members/by-name/John/books", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/members/by-name/Nobody/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/books/1/members", None).await;
    assert_eq!(body[0]["name"], "John");

    let (status, body) = send(&app, "DELETE", "/members/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Member has books");

    let (status, _) = send(&app, "DELETE", "/members/1/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(body["amount"], 1);

    let (_, body) = send(&app, "GET", "/books/borrowed", None).await;
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, "DELETE", "/members/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_borrow_error_statuses() {
    let app = app(1);
    send(&app, "POST", "/books", Some(json!({ "title": "Dune", "author": "Frank Herbert" }))).await;
    send(&app, "POST", "/books", Some(json!({ "title": "Emma", "author": "Jane Austen" }))).await;
    send(&app, "POST", "/members", Some(json!({ "name": "John" }))).await;

    let (status, _) = send(&app, "POST", "/members/9/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/members/1/books/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "BookNotAvailable");

    send(&app, "POST", "/members/1/books/1", None).await;
    let (status, body) = send(&app, "POST", "/members/1/books/2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Limit of books is 1");

    let (status, _) = send(&app, "DELETE", "/members/9/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/members/1/books/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app(10);

    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .uri("/api-docs/openapi.json")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
