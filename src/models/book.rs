//! Book model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

static CAPITALIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]").unwrap());
static NAME_SURNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+ [A-Z][a-z]+$").unwrap());

/// Book model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Copies on the shelf, never negative
    pub amount: i32,
}

/// Book as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookDto {
    pub title: String,
    pub author: String,
    pub amount: i32,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            amount: book.amount,
        }
    }
}

/// Create / update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(
        custom(function = "super::not_blank", message = "Title is required"),
        length(min = 3, message = "Title must be at least 3 characters long"),
        regex(path = *CAPITALIZED, message = "Title must start with a capital letter")
    )]
    #[serde(default)]
    pub title: String,
    #[validate(
        custom(function = "super::not_blank", message = "Author is required"),
        regex(path = *NAME_SURNAME, message = "Author must contain a capitalized name and surname")
    )]
    #[serde(default)]
    pub author: String,
}

/// Borrowed title with the number of members currently holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowedTitleCount {
    pub title: String,
    pub borrowers: i64,
}
