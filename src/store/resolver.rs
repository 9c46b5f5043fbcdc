//! Tag resolution for note writes.
//!
//! Runs on the caller's transaction so the returned tags are visible to the
//! note links written in the same unit of work. Tag names are globally
//! unique; a name that another writer inserts between our lookup and our
//! insert surfaces as a unique violation, which is answered by re-reading
//! the existing row.

use std::collections::{BTreeSet, HashSet};

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::Tag;
use crate::store::is_unique_violation;

/// Resolve every requested name to a tag row, creating the missing ones.
/// Duplicates in `requested` collapse to one tag. The result is sorted by name.
pub async fn resolve(
    conn: &mut SqliteConnection,
    requested: &[String],
) -> Result<Vec<Tag>, sqlx::Error> {
    let names: BTreeSet<&str> = requested.iter().map(String::as_str).collect();
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut resolved = fetch_by_names(conn, &names).await?;
    let found: HashSet<String> = resolved.iter().map(|t| t.name.clone()).collect();

    for name in names.into_iter().filter(|n| !found.contains(*n)) {
        resolved.push(insert_or_fetch(conn, name).await?);
    }

    resolved.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(resolved)
}

async fn fetch_by_names(
    conn: &mut SqliteConnection,
    names: &BTreeSet<&str>,
) -> Result<Vec<Tag>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, name FROM tags WHERE name IN (");
    let mut separated = query.separated(", ");
    for name in names {
        separated.push_bind(*name);
    }
    separated.push_unseparated(")");

    query.build_query_as::<Tag>().fetch_all(&mut *conn).await
}

/// Insert a tag named `name`, or return the row that already holds that name.
pub async fn insert_or_fetch(conn: &mut SqliteConnection, name: &str) -> Result<Tag, sqlx::Error> {
    let tag = Tag::new(name.to_string());

    let inserted = sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
        .bind(tag.id)
        .bind(&tag.name)
        .execute(&mut *conn)
        .await;

    match inserted {
        Ok(_) => Ok(tag),
        Err(err) if is_unique_violation(&err) => {
            tracing::debug!(tag = name, "tag name taken concurrently, using existing row");
            sqlx::query_as("SELECT id, name FROM tags WHERE name = ?")
                .bind(name)
                .fetch_one(&mut *conn)
                .await
        }
        Err(err) => Err(err),
    }
}
