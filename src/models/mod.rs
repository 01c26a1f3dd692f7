//! Data models for Libris

pub mod book;
pub mod member;

// Re-export commonly used types
pub use book::{Book, BookDto, BookPayload, BorrowedTitleCount};
pub use member::{Member, MemberDto, MemberPayload};

use validator::ValidationError;

/// Rejects empty and whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
