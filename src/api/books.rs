//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{BookDto, BookPayload, BorrowedTitleCount, MemberDto},
};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookDto>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<BookDto>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books.into_iter().map(BookDto::from).collect()))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDto),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookDto>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book.into()))
}

/// Register a copy of a book; a known title/author pair gains one copy
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book registered", body = BookDto),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<BookPayload>, AppError>,
) -> AppResult<(StatusCode, Json<BookDto>)> {
    payload.validate()?;
    let book = state.services.catalog.create_book(&payload).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Update title and author of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 204, description = "Book updated"),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): WithRejection<Json<BookPayload>, AppError>,
) -> AppResult<StatusCode> {
    payload.validate()?;
    state.services.catalog.update_book(id, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove one copy of a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "One copy removed"),
        (status = 400, description = "No copy left", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Members currently holding the book
#[utoipa::path(
    get,
    path = "/books/{id}/members",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Members holding a copy", body = Vec<MemberDto>),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_book_holders(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<MemberDto>>> {
    let members = state.services.stats.book_holders(id).await?;
    Ok(Json(members.into_iter().map(MemberDto::from).collect()))
}

/// Distinct titles currently borrowed
#[utoipa::path(
    get,
    path = "/books/borrowed",
    tag = "books",
    responses(
        (status = 200, description = "Borrowed titles", body = Vec<String>)
    )
)]
pub async fn list_borrowed_titles(State(state): State<crate::AppState>) -> AppResult<Json<Vec<String>>> {
    let titles = state.services.stats.borrowed_titles().await?;
    Ok(Json(titles))
}

/// Borrowed titles with the number of members holding them
#[utoipa::path(
    get,
    path = "/books/borrowed/counts",
    tag = "books",
    responses(
        (status = 200, description = "Borrow counts per title", body = Vec<BorrowedTitleCount>)
    )
)]
pub async fn list_borrowed_title_counts(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowedTitleCount>>> {
    let counts = state.services.stats.borrowed_title_counts().await?;
    Ok(Json(counts))
}
