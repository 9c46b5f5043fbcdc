use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{NewNote, NoteUpdate, NoteWithTags};
use crate::service::notes;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notes", post(create_note))
        .route(
            "/notes/{id}",
            get(read_note).put(update_note).delete(delete_note),
        )
        .route("/users/{user_id}/notes", get(list_user_notes))
}

async fn create_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(new): Json<NewNote>,
) -> Result<(StatusCode, Json<NoteWithTags>), AppError> {
    let note = notes::create(&state, &user, new).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn read_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteWithTags>, AppError> {
    Ok(Json(notes::get(&state, &user, id).await?))
}

async fn list_user_notes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<NoteWithTags>>, AppError> {
    Ok(Json(notes::list_for_user(&state, &user, user_id).await?))
}

async fn update_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<NoteUpdate>,
) -> Result<Json<NoteWithTags>, AppError> {
    Ok(Json(notes::update(&state, &user, id, changes).await?))
}

async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    notes::delete(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
