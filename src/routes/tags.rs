use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Tag, TagCreate, TagUpdate};
use crate::service::tags;
use crate::AppState;

// Tags are global; the extractor only proves the caller is signed in.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(read_tag).put(update_tag).delete(delete_tag))
}

async fn list_tags(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(tags::list(&state).await?))
}

async fn create_tag(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(form): Json<TagCreate>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    Ok((StatusCode::CREATED, Json(tags::create(&state, form).await?)))
}

async fn read_tag(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(tags::get(&state, id).await?))
}

async fn update_tag(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<TagUpdate>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(tags::update(&state, id, changes).await?))
}

async fn delete_tag(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    tags::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
