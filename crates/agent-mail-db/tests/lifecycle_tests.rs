//! Integration tests for the process-wide lifecycle: init/get/reset and the
//! service-object close path.
//!
//! The process-global handle is exercised from a single test function so
//! parallel tests in this binary never race on it.

use agent_mail_db::{Database, DatabaseSettings, database, init_database, reset_database};

#[tokio::test]
async fn reset_then_init_picks_up_new_settings() {
   let dir = tempfile::tempdir().unwrap();

   let first = DatabaseSettings {
      url: format!("sqlite:///{}/first.sqlite3", dir.path().display()),
      ..Default::default()
   };
   let handle = init_database(first.clone()).unwrap();
   assert!(handle.ensure_schema().await.unwrap());
   assert!(handle.schema_ready());

   // init is idempotent while a handle is live: new settings are ignored.
   let same = init_database(DatabaseSettings::default()).unwrap();
   assert_eq!(same.settings().url, first.url);
   assert_eq!(database().unwrap().settings().url, first.url);

   reset_database().await;
   assert!(handle.pool().is_closed(), "reset disposes the old pool");

   let second = DatabaseSettings {
      url: format!("sqlite:///{}/second.sqlite3", dir.path().display()),
      ..Default::default()
   };
   let rebuilt = init_database(second.clone()).unwrap();

   assert_eq!(rebuilt.settings().url, second.url);
   assert!(!rebuilt.schema_ready(), "ready flag starts false after reset");
   assert!(rebuilt.ensure_schema().await.unwrap(), "bootstrap re-runs");

   reset_database().await;
}

#[tokio::test]
async fn closed_database_rejects_new_sessions() {
   let dir = tempfile::tempdir().unwrap();
   let settings = DatabaseSettings {
      url: format!("sqlite:///{}/mail.sqlite3", dir.path().display()),
      ..Default::default()
   };
   let db = Database::connect(settings).unwrap();

   db.ensure_schema().await.unwrap();
   db.close().await;

   assert!(db.pool().is_closed());
   assert!(db.acquire().await.is_err());
}

#[tokio::test]
async fn fresh_instances_do_not_share_bootstrap_state() {
   let dir = tempfile::tempdir().unwrap();
   let settings = DatabaseSettings {
      url: format!("sqlite:///{}/mail.sqlite3", dir.path().display()),
      ..Default::default()
   };

   let first = Database::connect(settings.clone()).unwrap();
   assert!(first.ensure_schema().await.unwrap());
   first.close().await;

   // A rebuilt instance re-checks the (idempotent) schema even though the
   // file already carries it.
   let second = Database::connect(settings).unwrap();
   assert!(!second.schema_ready());
   assert!(second.ensure_schema().await.unwrap());
}
