use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Tag, TagUpdate};
use crate::store::begin_write;

/// Insert a tag. A taken name comes back as a unique-violation error.
pub async fn create(db: &SqlitePool, name: &str) -> Result<Tag, sqlx::Error> {
    let tag = Tag::new(name.to_string());

    sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
        .bind(tag.id)
        .bind(&tag.name)
        .execute(db)
        .await?;

    Ok(tag)
}

pub async fn get_by_id(db: &SqlitePool, id: Uuid) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn get_by_name(db: &SqlitePool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn list(db: &SqlitePool) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM tags ORDER BY name ASC")
        .fetch_all(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: Uuid,
    changes: &TagUpdate,
) -> Result<Option<Tag>, sqlx::Error> {
    let mut tx = begin_write(db).await?;

    let tag: Option<Tag> = sqlx::query_as("SELECT id, name FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(mut tag) = tag else {
        return Ok(None);
    };

    if let Some(name) = &changes.name {
        tag.name = name.clone();
        sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
            .bind(&tag.name)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(Some(tag))
}

/// Delete a tag and unlink it from every note. The notes stay.
pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<Option<Tag>, sqlx::Error> {
    let mut tx = begin_write(db).await?;

    let tag: Option<Tag> = sqlx::query_as("SELECT id, name FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(tag) = tag else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM note_tags WHERE tag_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(tag))
}
