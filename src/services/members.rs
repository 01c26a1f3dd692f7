//! Member management service

use chrono::Local;

use crate::{
    error::{AppError, AppResult},
    models::{Member, MemberPayload},
    repository::SharedStore,
};

#[derive(Clone)]
pub struct MembersService {
    store: SharedStore,
}

impl MembersService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        let mut tx = self.store.begin().await?;
        let members = tx.list_members().await?;
        tx.commit().await?;
        Ok(members)
    }

    pub async fn get_member(&self, id: i64) -> AppResult<Member> {
        let mut tx = self.store.begin().await?;
        let member = tx
            .member_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        tx.commit().await?;
        Ok(member)
    }

    /// Create a member dated today with no books
    pub async fn create_member(&self, payload: &MemberPayload) -> AppResult<Member> {
        let mut tx = self.store.begin().await?;

        if tx.member_name_exists(&payload.name).await? {
            return Err(AppError::AlreadyExists("Member already exists".to_string()));
        }
        let member = tx
            .insert_member(&payload.name, Local::now().date_naive())
            .await?;
        tx.commit().await?;

        tracing::info!(member_id = member.id, "Member created");
        Ok(member)
    }

    pub async fn update_member(&self, id: i64, payload: &MemberPayload) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        let mut member = tx
            .member_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        if member.name != payload.name && tx.member_name_exists(&payload.name).await? {
            return Err(AppError::AlreadyExists("Member already exists".to_string()));
        }
        member.name = payload.name.clone();
        tx.save_member(&member).await?;
        tx.commit().await?;

        tracing::info!(member_id = id, "Member renamed");
        Ok(())
    }

    /// Delete a member holding no book
    pub async fn delete_member(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        tx.member_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        if !tx.member_has_no_books(id).await? {
            tracing::debug!(member_id = id, "Delete rejected: member has books");
            return Err(AppError::HasBooks);
        }
        tx.delete_member(id).await?;
        tx.commit().await?;

        tracing::info!(member_id = id, "Member deleted");
        Ok(())
    }
}
