use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;

use crate::auth::{AccessToken, AuthUser, BearerToken};
use crate::error::AppError;
use crate::models::{Registration, User, UserUpdate};
use crate::service::accounts;
use crate::AppState;

/// OAuth2 password-grant form; `username` carries the email.
#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(login))
        .route(
            "/auth/users/me",
            get(me).patch(update_me).delete(delete_me),
        )
}

async fn register(
    State(state): State<AppState>,
    Json(form): Json<Registration>,
) -> Result<(StatusCode, Json<AccessToken>), AppError> {
    let token = accounts::register(&state, form).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AccessToken>, AppError> {
    Ok(Json(accounts::login(&state, &form.username, &form.password).await?))
}

async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<User>, AppError> {
    Ok(Json(accounts::identify(&state, &token).await?))
}

async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(changes): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    Ok(Json(accounts::update_profile(&state, &user, changes).await?))
}

async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    accounts::delete_account(&state, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
