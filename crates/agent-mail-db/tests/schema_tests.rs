//! Integration tests for the schema bootstrap: idempotency, concurrent
//! first-use, and full-text index consistency.

use agent_mail_db::{Database, DatabaseSettings};
use sqlx::Row;
use std::sync::Arc;
use tokio::task::JoinSet;

fn file_database(dir: &tempfile::TempDir) -> Database {
   let settings = DatabaseSettings {
      url: format!("sqlite:///{}/mail.sqlite3", dir.path().display()),
      ..Default::default()
   };
   Database::connect(settings).unwrap()
}

async fn object_names(db: &Database, kind: &str) -> Vec<String> {
   let mut session = db.acquire().await.unwrap();
   let rows = session
      .fetch_all(
         sqlx::query("SELECT name FROM sqlite_master WHERE type = ? ORDER BY name").bind(
            kind.to_string(),
         ),
      )
      .await
      .unwrap();
   rows.iter().map(|row| row.get::<String, _>(0)).collect()
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn bootstrap_creates_all_objects() {
   let dir = tempfile::tempdir().unwrap();
   let db = file_database(&dir);

   assert!(db.ensure_schema().await.unwrap());

   let tables = object_names(&db, "table").await;
   for expected in [
      "projects",
      "products",
      "agents",
      "messages",
      "message_recipients",
      "file_reservations",
      "product_project_links",
      "agent_links",
      "fts_messages",
   ] {
      assert!(tables.contains(&expected.to_string()), "missing table {expected}");
   }

   let triggers = object_names(&db, "trigger").await;
   assert_eq!(triggers, ["fts_messages_ad", "fts_messages_ai", "fts_messages_au"]);

   let indexes = object_names(&db, "index").await;
   let named: Vec<&String> = indexes.iter().filter(|name| name.starts_with("idx_")).collect();
   assert_eq!(named.len(), 16);
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
   let dir = tempfile::tempdir().unwrap();
   let db = file_database(&dir);

   assert!(db.ensure_schema().await.unwrap());
   assert!(db.schema_ready());

   // Second call observes the ready flag and does no work.
   assert!(!db.ensure_schema().await.unwrap());
   assert!(db.schema_ready());
}

#[tokio::test]
async fn concurrent_bootstrap_runs_exactly_once() {
   let dir = tempfile::tempdir().unwrap();
   let db = Arc::new(file_database(&dir));

   let mut tasks = JoinSet::new();
   for _ in 0..8 {
      let db = Arc::clone(&db);
      tasks.spawn(async move { db.ensure_schema().await });
   }

   let mut performed = 0;
   while let Some(result) = tasks.join_next().await {
      // No duplicate-object errors from any racer.
      if result.unwrap().unwrap() {
         performed += 1;
      }
   }

   assert_eq!(performed, 1, "exactly one caller performs the bootstrap");
   assert!(db.schema_ready());
}

#[tokio::test]
async fn bootstrap_failure_leaves_flag_unset() {
   let dir = tempfile::tempdir().unwrap();
   let db = file_database(&dir);

   db.close().await;

   assert!(db.ensure_schema().await.is_err());
   assert!(!db.schema_ready());
}

// ============================================================================
// Full-Text Index Consistency
// ============================================================================

async fn seed_sender(db: &Database) {
   let mut session = db.acquire().await.unwrap();
   session
      .execute(
         sqlx::query("INSERT INTO projects (slug, human_key, created_ts) VALUES (?, ?, ?)")
            .bind("demo-project")
            .bind("/work/demo")
            .bind("2026-02-03T10:00:00Z"),
      )
      .await
      .unwrap();
   session
      .execute(
         sqlx::query(
            "INSERT INTO agents (project_id, name, inception_ts) VALUES (1, 'courier', ?)",
         )
         .bind("2026-02-03T10:00:00Z"),
      )
      .await
      .unwrap();
}

async fn search(db: &Database, term: &str) -> Vec<i64> {
   let mut session = db.acquire().await.unwrap();
   let rows = session
      .fetch_all(
         sqlx::query("SELECT message_id FROM fts_messages WHERE fts_messages MATCH ?")
            .bind(term.to_string()),
      )
      .await
      .unwrap();
   rows.iter().map(|row| row.get::<i64, _>(0)).collect()
}

#[tokio::test]
async fn fts_index_follows_message_lifecycle() {
   let dir = tempfile::tempdir().unwrap();
   let db = file_database(&dir);
   db.ensure_schema().await.unwrap();
   seed_sender(&db).await;

   // Insert: the row becomes searchable by subject and body.
   let mut session = db.acquire().await.unwrap();
   session
      .execute(
         sqlx::query(
            "INSERT INTO messages (project_id, sender_id, subject, body_md, created_ts) \
             VALUES (1, 1, 'Alpha', 'Bravo', '2026-02-03T10:05:00Z')",
         ),
      )
      .await
      .unwrap();
   session.release();

   assert_eq!(search(&db, "Alpha").await.len(), 1);
   assert_eq!(search(&db, "Bravo").await.len(), 1);

   // Update: the stale entry is replaced, not duplicated.
   let mut session = db.acquire().await.unwrap();
   session
      .execute(sqlx::query("UPDATE messages SET subject = 'Charlie' WHERE id = 1"))
      .await
      .unwrap();
   session.release();

   assert!(search(&db, "Alpha").await.is_empty());
   assert_eq!(search(&db, "Charlie").await.len(), 1);

   // Delete: the entry disappears with the row.
   let mut session = db.acquire().await.unwrap();
   session
      .execute(sqlx::query("DELETE FROM messages WHERE id = 1"))
      .await
      .unwrap();
   session.release();

   assert!(search(&db, "Charlie").await.is_empty());
}
