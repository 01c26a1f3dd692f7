//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library borrowing REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_book_holders,
        books::list_borrowed_titles,
        books::list_borrowed_title_counts,
        // Members
        members::list_members,
        members::get_member,
        members::list_books_by_member_name,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Borrowing
        members::borrow_book,
        members::return_book,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::models::BookDto,
            crate::models::BookPayload,
            crate::models::BorrowedTitleCount,
            crate::models::MemberDto,
            crate::models::MemberPayload,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "books", description = "Book catalog"),
        (name = "members", description = "Library members"),
        (name = "borrowing", description = "Borrow and return books")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
