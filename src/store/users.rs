use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{NewUser, User, UserUpdate};
use crate::store::begin_write;

pub async fn create(db: &SqlitePool, new: NewUser) -> Result<User, sqlx::Error> {
    let user = User::new(new);

    sqlx::query(
        r#"
        INSERT INTO users
            (id, external_id, email, password_hash, first_name, last_name, username,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(user.id)
    .bind(user.external_id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.username)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(db)
    .await?;

    Ok(user)
}

pub async fn get_by_id(db: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn get_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn get_by_external_id(
    db: &SqlitePool,
    external_id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE external_id = ?")
        .bind(external_id)
        .fetch_optional(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: Uuid,
    changes: &UserUpdate,
) -> Result<Option<User>, sqlx::Error> {
    let mut tx = begin_write(db).await?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(mut user) = user else {
        return Ok(None);
    };

    changes.apply(&mut user);
    user.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET external_id = ?, first_name = ?, last_name = ?, username = ?, updated_at = ?
        WHERE id = ?
        "#
    )
    .bind(user.external_id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.username)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(user))
}

/// Delete a user together with every note they own and those notes' tag links.
/// Tags themselves are left alone.
pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let mut tx = begin_write(db).await?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(user) = user else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM note_tags WHERE note_id IN (SELECT id FROM notes WHERE user_id = ?)")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let notes = sqlx::query("DELETE FROM notes WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::debug!(user_id = %id, notes = notes.rows_affected(), "deleted user");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::store::testing::new_user;

    #[tokio::test]
    async fn create_then_lookup_by_every_key() {
        let db = test_pool().await;
        let mut new = new_user("jane@example.com");
        new.external_id = Some(123456789);
        let user = create(&db, new).await.unwrap();

        let by_id = get_by_id(&db, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "jane@example.com");
        let by_email = get_by_email(&db, "jane@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_external = get_by_external_id(&db, 123456789).await.unwrap().unwrap();
        assert_eq!(by_external.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_violates_unique_constraint() {
        let db = test_pool().await;
        create(&db, new_user("jane@example.com")).await.unwrap();
        let err = create(&db, new_user("jane@example.com")).await.unwrap_err();
        assert!(crate::store::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn many_users_may_lack_an_external_id() {
        let db = test_pool().await;
        create(&db, new_user("a@example.com")).await.unwrap();
        create(&db, new_user("b@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let db = test_pool().await;
        let user = create(&db, new_user("jane@example.com")).await.unwrap();

        let changes = UserUpdate {
            username: Some("jd".to_string()),
            ..Default::default()
        };
        let updated = update(&db, user.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.username, "jd");
        assert_eq!(updated.first_name, "Jane");

        let stored = get_by_id(&db, user.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "jd");
        assert_eq!(stored.last_name, "Doe");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_user_are_none() {
        let db = test_pool().await;
        let missing = Uuid::new_v4();
        assert!(update(&db, missing, &UserUpdate::default()).await.unwrap().is_none());
        assert!(delete(&db, missing).await.unwrap().is_none());
    }
}
