use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::{NewNote, Note, NoteTagRow, NoteUpdate, NoteWithTags, Tag};
use crate::store::{begin_write, resolver};

/// Insert a note owned by `owner_id` and link it to its resolved tags.
/// Tag creation and linking commit together with the note.
pub async fn create(
    db: &SqlitePool,
    owner_id: Uuid,
    new: &NewNote,
) -> Result<NoteWithTags, sqlx::Error> {
    let note = Note::new(owner_id, new.title.clone(), new.text.clone());
    let mut tx = begin_write(db).await?;

    sqlx::query(
        r#"
        INSERT INTO notes (id, user_id, title, text, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(note.id)
    .bind(note.user_id)
    .bind(&note.title)
    .bind(&note.text)
    .bind(note.created_at)
    .bind(note.updated_at)
    .execute(&mut *tx)
    .await?;

    let tags = resolver::resolve(&mut tx, &new.tags).await?;
    link_tags(&mut tx, note.id, &tags).await?;

    tx.commit().await?;
    Ok(NoteWithTags { note, tags })
}

pub async fn get_by_id(db: &SqlitePool, id: Uuid) -> Result<Option<NoteWithTags>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let note: Option<Note> = sqlx::query_as("SELECT * FROM notes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(note) = note else {
        return Ok(None);
    };

    let tags = tags_for_note(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Some(NoteWithTags { note, tags }))
}

/// All notes owned by `owner_id`, oldest first.
pub async fn list_by_owner(
    db: &SqlitePool,
    owner_id: Uuid,
) -> Result<Vec<NoteWithTags>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let notes: Vec<Note> =
        sqlx::query_as("SELECT * FROM notes WHERE user_id = ? ORDER BY created_at ASC, id ASC")
            .bind(owner_id)
            .fetch_all(&mut *tx)
            .await?;

    let rows: Vec<NoteTagRow> = sqlx::query_as(
        r#"
        SELECT nt.note_id, t.id, t.name
        FROM note_tags nt
        JOIN tags t ON t.id = nt.tag_id
        JOIN notes n ON n.id = nt.note_id
        WHERE n.user_id = ?
        ORDER BY t.name ASC
        "#
    )
    .bind(owner_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut by_note: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in rows {
        by_note.entry(row.note_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
        });
    }

    Ok(notes
        .into_iter()
        .map(|note| {
            let tags = by_note.remove(&note.id).unwrap_or_default();
            NoteWithTags { note, tags }
        })
        .collect())
}

/// Apply the supplied fields. When `changes.tags` is present the note's tag
/// links are replaced by the resolved set; otherwise they are kept.
pub async fn update(
    db: &SqlitePool,
    id: Uuid,
    changes: &NoteUpdate,
) -> Result<Option<NoteWithTags>, sqlx::Error> {
    let mut tx = begin_write(db).await?;

    let note: Option<Note> = sqlx::query_as("SELECT * FROM notes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(mut note) = note else {
        return Ok(None);
    };

    changes.apply(&mut note);
    note.updated_at = Utc::now();

    sqlx::query("UPDATE notes SET title = ?, text = ?, updated_at = ? WHERE id = ?")
        .bind(&note.title)
        .bind(&note.text)
        .bind(note.updated_at)
        .bind(note.id)
        .execute(&mut *tx)
        .await?;

    let tags = match &changes.tags {
        Some(names) => {
            sqlx::query("DELETE FROM note_tags WHERE note_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let tags = resolver::resolve(&mut tx, names).await?;
            link_tags(&mut tx, id, &tags).await?;
            tags
        }
        None => tags_for_note(&mut tx, id).await?,
    };

    tx.commit().await?;
    Ok(Some(NoteWithTags { note, tags }))
}

/// Delete a note and its tag links. Tags are never removed here.
pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<Option<Note>, sqlx::Error> {
    let mut tx = begin_write(db).await?;

    let note: Option<Note> = sqlx::query_as("SELECT * FROM notes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(note) = note else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM note_tags WHERE note_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(note))
}

async fn tags_for_note(
    conn: &mut SqliteConnection,
    note_id: Uuid,
) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT t.id, t.name
        FROM tags t
        JOIN note_tags nt ON nt.tag_id = t.id
        WHERE nt.note_id = ?
        ORDER BY t.name ASC
        "#
    )
    .bind(note_id)
    .fetch_all(&mut *conn)
    .await
}

async fn link_tags(
    conn: &mut SqliteConnection,
    note_id: Uuid,
    tags: &[Tag],
) -> Result<(), sqlx::Error> {
    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?, ?)")
            .bind(note_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
