//! Best-effort table-name extraction from SQL statements.
//!
//! Attribution only needs to be good enough for a histogram, so the scan is
//! deliberately shallow: the first `INSERT INTO`, `UPDATE`, or `FROM` target
//! wins, schema qualification and quoting characters are stripped, and
//! statements with no recognizable target yield `None`.

use regex::Regex;
use std::sync::OnceLock;

fn insert_pattern() -> &'static Regex {
   static RE: OnceLock<Regex> = OnceLock::new();
   RE.get_or_init(|| {
      Regex::new(r#"(?i)\binsert\s+into\s+([\w."`\[\]]+)"#).expect("invalid regex")
   })
}

fn update_pattern() -> &'static Regex {
   static RE: OnceLock<Regex> = OnceLock::new();
   RE.get_or_init(|| Regex::new(r#"(?i)\bupdate\s+([\w."`\[\]]+)"#).expect("invalid regex"))
}

fn from_pattern() -> &'static Regex {
   static RE: OnceLock<Regex> = OnceLock::new();
   RE.get_or_init(|| Regex::new(r#"(?i)\bfrom\s+([\w."`\[\]]+)"#).expect("invalid regex"))
}

/// Extract the table a statement operates on, if one can be recognized.
///
/// `INSERT INTO` is checked before `UPDATE` and `FROM` so that statements
/// like `INSERT INTO a SELECT * FROM b` attribute to the written table.
pub fn extract_table_name(statement: &str) -> Option<String> {
   for pattern in [insert_pattern(), update_pattern(), from_pattern()] {
      if let Some(captures) = pattern.captures(statement) {
         let cleaned = clean_table_name(&captures[1]);
         if !cleaned.is_empty() {
            return Some(cleaned);
         }
      }
   }
   None
}

/// Strip schema qualification (`main.messages` → `messages`) and SQL quoting
/// characters from a captured table token.
fn clean_table_name(raw: &str) -> String {
   let cleaned = raw.trim();
   let cleaned = cleaned.rsplit('.').next().unwrap_or(cleaned);
   cleaned
      .trim_matches(|c| matches!(c, '`' | '"' | '[' | ']'))
      .to_string()
}
