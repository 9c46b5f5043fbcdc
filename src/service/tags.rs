//! Tags are a shared vocabulary: any authenticated user may manage any tag.

use uuid::Uuid;

use crate::error::{AppError, Entity};
use crate::models::{Tag, TagCreate, TagUpdate};
use crate::store::{is_unique_violation, tags};
use crate::AppState;

pub async fn create(state: &AppState, form: TagCreate) -> Result<Tag, AppError> {
    match tags::create(&state.db, &form.name).await {
        Ok(tag) => Ok(tag),
        Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateTagName),
        Err(e) => Err(e.into()),
    }
}

pub async fn get(state: &AppState, id: Uuid) -> Result<Tag, AppError> {
    tags::get_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(Entity::Tag))
}

pub async fn list(state: &AppState) -> Result<Vec<Tag>, AppError> {
    Ok(tags::list(&state.db).await?)
}

pub async fn update(state: &AppState, id: Uuid, changes: TagUpdate) -> Result<Tag, AppError> {
    match tags::update(&state.db, id, &changes).await {
        Ok(Some(tag)) => Ok(tag),
        Ok(None) => Err(AppError::NotFound(Entity::Tag)),
        Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateTagName),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let tag = tags::delete(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(Entity::Tag))?;
    tracing::info!(tag_id = %tag.id, tag = %tag.name, "deleted tag");
    Ok(())
}
