use notestack::db;
use notestack::models::{NewNote, NewUser, NoteUpdate, NoteWithTags, TagUpdate, User, UserUpdate};
use notestack::store::{notes, tags, users};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::task::JoinSet;

/// A file-backed store with several connections, so units of work really overlap.
async fn file_pool() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("notes.db").display());
    let pool = db::init_pool(&url, 8)
        .await
        .expect("Failed to open file-backed pool");
    (dir, pool)
}

async fn owner(db: &SqlitePool, email: &str) -> User {
    users::create(
        db,
        NewUser {
            external_id: None,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            username: "jane".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn seed_notes(db: &SqlitePool, user: &User, count: usize) -> Vec<NoteWithTags> {
    let mut created = Vec::new();
    for i in 0..count {
        let new = NewNote {
            title: format!("note {i}"),
            text: "body".to_string(),
            tags: vec!["seed".to_string()],
        };
        created.push(notes::create(db, user.id, &new).await.unwrap());
    }
    created
}

#[tokio::test]
async fn concurrent_note_updates_all_succeed() {
    let (_dir, db) = file_pool().await;
    let user = owner(&db, "user@example.com").await;
    let seeded = seed_notes(&db, &user, 16).await;

    let mut set = JoinSet::new();
    for i in 0..160 {
        let db = db.clone();
        let id = seeded[i % seeded.len()].note.id;
        set.spawn(async move {
            let changes = NoteUpdate {
                title: Some(format!("edit {i}")),
                text: None,
                tags: Some(vec![format!("t{}", i % 5), "shared".to_string()]),
            };
            notes::update(&db, id, &changes).await
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(Some(note)) => assert_eq!(note.tags.len(), 2),
            Ok(None) => failures.push("note vanished".to_string()),
            Err(e) => failures.push(e.to_string()),
        }
    }
    assert!(
        failures.is_empty(),
        "{} updates failed: {:?}",
        failures.len(),
        failures.first()
    );

    let names: Vec<String> = tags::list(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["seed", "shared", "t0", "t1", "t2", "t3", "t4"]);
}

#[tokio::test]
async fn concurrent_deletes_and_renames_all_succeed() {
    let (_dir, db) = file_pool().await;
    let user = owner(&db, "user@example.com").await;
    let seeded = seed_notes(&db, &user, 24).await;

    let mut tag_ids = Vec::new();
    for i in 0..8 {
        tag_ids.push(tags::create(&db, &format!("tag {i}")).await.unwrap().id);
    }

    let mut set: JoinSet<Result<bool, sqlx::Error>> = JoinSet::new();
    for note in &seeded {
        let db = db.clone();
        let id = note.note.id;
        set.spawn(async move { Ok(notes::delete(&db, id).await?.is_some()) });
    }
    for (i, id) in tag_ids.iter().copied().enumerate() {
        let db = db.clone();
        set.spawn(async move {
            let changes = TagUpdate {
                name: Some(format!("renamed {i}")),
            };
            Ok(tags::update(&db, id, &changes).await?.is_some())
        });
    }
    for i in 0..8 {
        let db = db.clone();
        let id = user.id;
        set.spawn(async move {
            let changes = UserUpdate {
                username: Some(format!("jane{i}")),
                ..Default::default()
            };
            Ok(users::update(&db, id, &changes).await?.is_some())
        });
    }

    while let Some(joined) = set.join_next().await {
        assert!(joined.unwrap().unwrap());
    }

    assert!(notes::list_by_owner(&db, user.id).await.unwrap().is_empty());
    let renamed = tags::list(&db)
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.name.starts_with("renamed"))
        .count();
    assert_eq!(renamed, 8);
    assert!(tags::get_by_name(&db, "seed").await.unwrap().is_some());
}
