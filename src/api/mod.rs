//! API handlers for Libris REST endpoints

pub mod books;
pub mod health;
pub mod members;
pub mod openapi;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/borrowed", get(books::list_borrowed_titles))
        .route("/books/borrowed/counts", get(books::list_borrowed_title_counts))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/members", get(books::list_book_holders))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route("/members/by-name/:name/books", get(members::list_books_by_member_name))
        .route(
            "/members/:id",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        // Borrowing
        .route(
            "/members/:id/books/:book_id",
            post(members::borrow_book).delete(members::return_book),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
