//! Persistence gateway. Every public function is one unit of work: it opens
//! its own transaction (or issues a single statement) and commits before
//! returning. A transaction dropped on an error path rolls back.
//!
//! `get`, `update` and `delete` return `Ok(None)` when the row does not exist.
//!
//! Units of work that write open with `BEGIN IMMEDIATE` so they take SQLite's
//! write lock up front. Concurrent writers then wait on the busy timeout
//! instead of failing with `database is locked` when a read lock is upgraded.

pub mod notes;
pub mod resolver;
pub mod tags;
pub mod users;

use sqlx::{Sqlite, SqlitePool, Transaction};

pub(crate) async fn begin_write(
    db: &SqlitePool,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    db.begin_with("BEGIN IMMEDIATE").await
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}
