use uuid::Uuid;

use crate::auth::{authorize, ensure_owner};
use crate::error::{AppError, Entity};
use crate::models::{NewNote, NoteUpdate, NoteWithTags, User};
use crate::store::notes;
use crate::AppState;

pub async fn create(state: &AppState, user: &User, new: NewNote) -> Result<NoteWithTags, AppError> {
    let note = notes::create(&state.db, user.id, &new).await?;
    tracing::info!(
        user_id = %user.id,
        note_id = %note.note.id,
        tags = note.tags.len(),
        "created note"
    );
    Ok(note)
}

pub async fn get(state: &AppState, user: &User, id: Uuid) -> Result<NoteWithTags, AppError> {
    let note = notes::get_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(Entity::Note))?;
    ensure_owner(user, note)
}

/// Notes owned by `owner_id`; only that owner may list them.
pub async fn list_for_user(
    state: &AppState,
    user: &User,
    owner_id: Uuid,
) -> Result<Vec<NoteWithTags>, AppError> {
    authorize(user, owner_id)?;
    Ok(notes::list_by_owner(&state.db, owner_id).await?)
}

pub async fn update(
    state: &AppState,
    user: &User,
    id: Uuid,
    changes: NoteUpdate,
) -> Result<NoteWithTags, AppError> {
    get(state, user, id).await?;
    notes::update(&state.db, id, &changes)
        .await?
        .ok_or(AppError::NotFound(Entity::Note))
}

pub async fn delete(state: &AppState, user: &User, id: Uuid) -> Result<(), AppError> {
    get(state, user, id).await?;
    notes::delete(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(Entity::Note))?;
    tracing::info!(user_id = %user.id, note_id = %id, "deleted note");
    Ok(())
}
