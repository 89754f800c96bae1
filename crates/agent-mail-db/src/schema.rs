//! Schema DDL: primary tables, the full-text index, its synchronizing
//! triggers, and the secondary indexes.
//!
//! Every statement is `IF NOT EXISTS` so the bootstrap sequence can be
//! re-run from any point after a mid-bootstrap failure. The `fts_messages`
//! structure is derived state — callers never write it directly; the three
//! triggers keep it exactly in sync with `messages` at every commit.

/// Primary entity tables for the agent-mail store.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS projects (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   slug TEXT NOT NULL UNIQUE,
   human_key TEXT NOT NULL,
   created_ts TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS products (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   slug TEXT NOT NULL UNIQUE,
   name TEXT NOT NULL,
   created_ts TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS agents (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   project_id INTEGER NOT NULL REFERENCES projects(id),
   name TEXT NOT NULL,
   program TEXT,
   model TEXT,
   task_description TEXT,
   inception_ts TEXT NOT NULL,
   last_active_ts TEXT,
   UNIQUE (project_id, name)
);
CREATE TABLE IF NOT EXISTS messages (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   project_id INTEGER NOT NULL REFERENCES projects(id),
   sender_id INTEGER NOT NULL REFERENCES agents(id),
   thread_id TEXT,
   subject TEXT NOT NULL,
   body_md TEXT NOT NULL,
   importance TEXT NOT NULL DEFAULT 'normal',
   ack_requested INTEGER NOT NULL DEFAULT 0,
   attachments TEXT,
   created_ts TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS message_recipients (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   message_id INTEGER NOT NULL REFERENCES messages(id),
   agent_id INTEGER NOT NULL REFERENCES agents(id),
   kind TEXT NOT NULL DEFAULT 'to',
   read_ts TEXT,
   ack_ts TEXT
);
CREATE TABLE IF NOT EXISTS file_reservations (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   project_id INTEGER NOT NULL REFERENCES projects(id),
   agent_id INTEGER NOT NULL REFERENCES agents(id),
   path_pattern TEXT NOT NULL,
   exclusive INTEGER NOT NULL DEFAULT 1,
   reason TEXT,
   created_ts TEXT NOT NULL,
   expires_ts TEXT NOT NULL,
   released_ts TEXT
);
CREATE TABLE IF NOT EXISTS product_project_links (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   product_id INTEGER NOT NULL REFERENCES products(id),
   project_id INTEGER NOT NULL REFERENCES projects(id)
);
CREATE TABLE IF NOT EXISTS agent_links (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   a_project_id INTEGER NOT NULL REFERENCES projects(id),
   a_agent_id INTEGER NOT NULL REFERENCES agents(id),
   b_project_id INTEGER NOT NULL REFERENCES projects(id),
   b_agent_id INTEGER NOT NULL REFERENCES agents(id),
   status TEXT NOT NULL DEFAULT 'pending',
   created_ts TEXT NOT NULL
);
";

/// Searchable projection over message subject and body.
pub const CREATE_FTS_TABLE: &str = "CREATE VIRTUAL TABLE IF NOT EXISTS fts_messages \
   USING fts5(message_id UNINDEXED, subject, body)";

/// Triggers keeping `fts_messages` consistent with `messages`.
///
/// The update trigger deletes the stale entry before re-inserting from the
/// new row, so an updated subject/body is re-indexed rather than duplicated.
pub const FTS_TRIGGERS: [&str; 3] = [
   "
   CREATE TRIGGER IF NOT EXISTS fts_messages_ai
   AFTER INSERT ON messages
   BEGIN
      INSERT INTO fts_messages(rowid, message_id, subject, body)
      VALUES (new.id, new.id, new.subject, new.body_md);
   END;
   ",
   "
   CREATE TRIGGER IF NOT EXISTS fts_messages_ad
   AFTER DELETE ON messages
   BEGIN
      DELETE FROM fts_messages WHERE rowid = old.id;
   END;
   ",
   "
   CREATE TRIGGER IF NOT EXISTS fts_messages_au
   AFTER UPDATE ON messages
   BEGIN
      DELETE FROM fts_messages WHERE rowid = old.id;
      INSERT INTO fts_messages(rowid, message_id, subject, body)
      VALUES (new.id, new.id, new.subject, new.body_md);
   END;
   ",
];

/// Secondary indexes for the common access patterns.
pub const SECONDARY_INDEXES: [&str; 16] = [
   "CREATE INDEX IF NOT EXISTS idx_messages_created_ts ON messages(created_ts)",
   "CREATE INDEX IF NOT EXISTS idx_messages_thread_id ON messages(thread_id)",
   "CREATE INDEX IF NOT EXISTS idx_messages_importance ON messages(importance)",
   "CREATE INDEX IF NOT EXISTS idx_messages_sender_created \
      ON messages(sender_id, created_ts DESC)",
   "CREATE INDEX IF NOT EXISTS idx_messages_project_created \
      ON messages(project_id, created_ts DESC)",
   "CREATE INDEX IF NOT EXISTS idx_file_reservations_expires_ts \
      ON file_reservations(expires_ts)",
   "CREATE INDEX IF NOT EXISTS idx_message_recipients_agent ON message_recipients(agent_id)",
   "CREATE INDEX IF NOT EXISTS idx_message_recipients_agent_message \
      ON message_recipients(agent_id, message_id)",
   "CREATE INDEX IF NOT EXISTS idx_messages_project_sender_created \
      ON messages(project_id, sender_id, created_ts DESC)",
   "CREATE INDEX IF NOT EXISTS idx_file_reservations_project_released_expires \
      ON file_reservations(project_id, released_ts, expires_ts)",
   "CREATE INDEX IF NOT EXISTS idx_file_reservations_project_agent_released \
      ON file_reservations(project_id, agent_id, released_ts)",
   "CREATE INDEX IF NOT EXISTS idx_product_project \
      ON product_project_links(product_id, project_id)",
   "CREATE INDEX IF NOT EXISTS idx_agent_links_a_project ON agent_links(a_project_id)",
   "CREATE INDEX IF NOT EXISTS idx_agent_links_b_project ON agent_links(b_project_id)",
   "CREATE INDEX IF NOT EXISTS idx_agent_links_b_project_agent \
      ON agent_links(b_project_id, b_agent_id)",
   "CREATE INDEX IF NOT EXISTS idx_agent_links_status ON agent_links(status)",
];

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn every_statement_is_idempotent() {
      assert!(CREATE_FTS_TABLE.contains("IF NOT EXISTS"));
      for trigger in FTS_TRIGGERS {
         assert!(trigger.contains("CREATE TRIGGER IF NOT EXISTS"));
      }
      for index in SECONDARY_INDEXES {
         assert!(index.starts_with("CREATE INDEX IF NOT EXISTS"));
      }
      for statement in CREATE_TABLES.split(';') {
         let statement = statement.trim();
         if !statement.is_empty() {
            assert!(statement.starts_with("CREATE TABLE IF NOT EXISTS"));
         }
      }
   }

   #[test]
   fn triggers_cover_insert_update_delete() {
      assert!(FTS_TRIGGERS[0].contains("AFTER INSERT ON messages"));
      assert!(FTS_TRIGGERS[1].contains("AFTER DELETE ON messages"));
      assert!(FTS_TRIGGERS[2].contains("AFTER UPDATE ON messages"));
   }
}
