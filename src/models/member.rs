//! Member model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Member model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    /// Unique across all members
    pub name: String,
    pub creation_date: NaiveDate,
}

/// Member as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub name: String,
    pub creation_date: NaiveDate,
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        Self {
            name: member.name,
            creation_date: member.creation_date,
        }
    }
}

/// Create / update member request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MemberPayload {
    #[validate(custom(function = "super::not_blank", message = "Name is required"))]
    #[serde(default)]
    pub name: String,
}
