//! Member management and borrowing endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{BookDto, MemberDto, MemberPayload},
};

/// List all members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "All members", body = Vec<MemberDto>)
    )
)]
pub async fn list_members(State(state): State<crate::AppState>) -> AppResult<Json<Vec<MemberDto>>> {
    let members = state.services.members.list_members().await?;
    Ok(Json(members.into_iter().map(MemberDto::from).collect()))
}

/// Get member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i64, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = MemberDto),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MemberDto>> {
    let member = state.services.members.get_member(id).await?;
    Ok(Json(member.into()))
}

/// Books currently held by the named member
#[utoipa::path(
    get,
    path = "/members/by-name/{name}/books",
    tag = "members",
    params(("name" = String, Path, description = "Member name")),
    responses(
        (status = 200, description = "Borrowed books", body = Vec<BookDto>),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books_by_member_name(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<BookDto>>> {
    let books = state.services.stats.books_borrowed_by(&name).await?;
    Ok(Json(books.into_iter().map(BookDto::from).collect()))
}

/// Create a member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = MemberPayload,
    responses(
        (status = 201, description = "Member created", body = MemberDto),
        (status = 400, description = "Invalid payload or name taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<MemberPayload>, AppError>,
) -> AppResult<(StatusCode, Json<MemberDto>)> {
    payload.validate()?;
    let member = state.services.members.create_member(&payload).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// Rename a member
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i64, Path, description = "Member ID")),
    request_body = MemberPayload,
    responses(
        (status = 204, description = "Member renamed"),
        (status = 400, description = "Invalid payload or name taken", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): WithRejection<Json<MemberPayload>, AppError>,
) -> AppResult<StatusCode> {
    payload.validate()?;
    state.services.members.update_member(id, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a member holding no book
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i64, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 400, description = "Member still holds books", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.members.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow a book for a member
#[utoipa::path(
    post,
    path = "/members/{id}/books/{book_id}",
    tag = "borrowing",
    params(
        ("id" = i64, Path, description = "Member ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = BookDto),
        (status = 400, description = "Book already held or limit reached", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found or book not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Path((member_id, book_id)): Path<(i64, i64)>,
) -> AppResult<(StatusCode, Json<BookDto>)> {
    let book = state.services.borrowing.borrow(member_id, book_id).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Return a borrowed book
#[utoipa::path(
    delete,
    path = "/members/{id}/books/{book_id}",
    tag = "borrowing",
    params(
        ("id" = i64, Path, description = "Member ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book returned"),
        (status = 404, description = "Member or book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path((member_id, book_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.borrowing.return_book(member_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
