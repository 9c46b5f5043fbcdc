use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::AccessToken;
use crate::error::AppError;
use crate::models::{NewUser, Registration, User, UserUpdate};
use crate::store::{is_unique_violation, users};
use crate::AppState;

/// Create an account and hand back a token bound to its email.
pub async fn register(state: &AppState, form: Registration) -> Result<AccessToken, AppError> {
    if users::get_by_email(&state.db, &form.email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }
    if let Some(external_id) = form.external_id {
        if users::get_by_external_id(&state.db, external_id).await?.is_some() {
            return Err(AppError::DuplicateExternalId);
        }
    }

    let password_hash = hash_password_blocking(form.password).await?;
    let email = form.email.clone();
    let new = NewUser {
        external_id: form.external_id,
        email: form.email,
        password_hash,
        first_name: form.first_name,
        last_name: form.last_name,
        username: form.username,
    };

    let user = match users::create(&state.db, new).await {
        Ok(user) => user,
        // Lost a race against a concurrent registration.
        Err(e) if is_unique_violation(&e) => {
            return Err(claimed_key(state, &email, form.external_id).await?);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "registered user");
    Ok(AccessToken::bearer(state.tokens.issue(&user.email)?))
}

/// Name the unique key another registration took first.
async fn claimed_key(
    state: &AppState,
    email: &str,
    external_id: Option<i64>,
) -> Result<AppError, AppError> {
    if users::get_by_email(&state.db, email).await?.is_some() {
        return Ok(AppError::DuplicateEmail);
    }
    if let Some(external_id) = external_id {
        if users::get_by_external_id(&state.db, external_id).await?.is_some() {
            return Ok(AppError::DuplicateExternalId);
        }
    }
    Ok(AppError::DuplicateEmail)
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AccessToken, AppError> {
    let Some(user) = users::get_by_email(&state.db, email).await? else {
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(AccessToken::bearer(state.tokens.issue(&user.email)?))
}

/// Who-am-I: the token is valid but its subject may since have been deleted.
pub async fn identify(state: &AppState, token: &str) -> Result<User, AppError> {
    let email = state.tokens.validate(token)?;
    users::get_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::UserNotFound)
}

/// Resolve the acting user for a resource operation. A token whose subject no
/// longer exists is treated like any other invalid credential.
pub async fn authenticate(state: &AppState, token: &str) -> Result<User, AppError> {
    match identify(state, token).await {
        Err(AppError::UserNotFound) => Err(AppError::InvalidToken),
        other => other,
    }
}

pub async fn update_profile(
    state: &AppState,
    user: &User,
    changes: UserUpdate,
) -> Result<User, AppError> {
    if let Some(external_id) = changes.external_id {
        if let Some(holder) = users::get_by_external_id(&state.db, external_id).await? {
            if holder.id != user.id {
                return Err(AppError::DuplicateExternalId);
            }
        }
    }

    match users::update(&state.db, user.id, &changes).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AppError::UserNotFound),
        Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateExternalId),
        Err(e) => Err(e.into()),
    }
}

/// Delete the account with all of its notes. Tags are shared and survive.
pub async fn delete_account(state: &AppState, user: &User) -> Result<(), AppError> {
    users::delete(&state.db, user.id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    tracing::info!(user_id = %user.id, "deleted account");
    Ok(())
}
