//! SQLite secondary index over activities.
//!
//! The JSON files under `activities/` stay authoritative; this index only
//! exists so listing and searching don't have to read every activity.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::{Activity, ActivityStatus};

/// Row of the `activities` table
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedActivity {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub status: ActivityStatus,
    pub created_at: String,
    pub updated_at: String,
    pub problem: String,
    pub stakeholders: Vec<String>,
    pub constraints: String,
    pub affected_system: String,
}

pub struct ActivityIndex {
    db: Connection,
}

impl ActivityIndex {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let db = Connection::open(db_path)
            .with_context(|| format!("Failed to open index at {}", db_path.display()))?;
        Self::with_connection(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        ensure_schema(&db)?;
        Ok(Self { db })
    }

    pub fn upsert(&self, activity: &Activity) -> Result<()> {
        self.db
            .execute(
                "INSERT OR REPLACE INTO activities
                 (slug, title, description, status, created_at, updated_at,
                  problem, stakeholders, constraints, affected_system)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    activity.slug,
                    activity.title,
                    activity.description,
                    activity.status.to_string(),
                    activity.created_at,
                    activity.updated_at,
                    activity.problem,
                    activity.stakeholders.join(","),
                    activity.constraints,
                    activity.affected_system,
                ],
            )
            .with_context(|| format!("Failed to index activity {}", activity.slug))?;
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Result<Option<IndexedActivity>> {
        self.db
            .query_row(
                &format!("SELECT {COLUMNS} FROM activities WHERE slug = ?1"),
                params![slug],
                read_row,
            )
            .optional()
            .with_context(|| format!("Failed to look up activity {slug}"))
    }

    /// Substring search over title, description and problem, newest first.
    ///
    /// An empty query matches everything.
    pub fn search(
        &self,
        query: &str,
        status: Option<ActivityStatus>,
    ) -> Result<Vec<IndexedActivity>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let status = status.map(|s| s.to_string());
        let mut stmt = self.db.prepare(&format!(
            "SELECT {COLUMNS} FROM activities
             WHERE (title LIKE ?1 ESCAPE '\\'
                    OR description LIKE ?1 ESCAPE '\\'
                    OR problem LIKE ?1 ESCAPE '\\')
               AND (?2 IS NULL OR status = ?2)
             ORDER BY updated_at DESC"
        ))?;
        let rows = stmt
            .query_map(params![pattern, status], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to search activities")?;
        Ok(rows)
    }

    pub fn delete(&self, slug: &str) -> Result<bool> {
        let removed = self
            .db
            .execute("DELETE FROM activities WHERE slug = ?1", params![slug])
            .with_context(|| format!("Failed to remove activity {slug} from index"))?;
        Ok(removed > 0)
    }
}

/// Make `%`, `_` and `\` match literally inside a LIKE pattern.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const COLUMNS: &str = "slug, title, description, status, created_at, updated_at, \
                       problem, stakeholders, constraints, affected_system";

fn ensure_schema(db: &Connection) -> Result<()> {
    db.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS activities (
            slug TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            problem TEXT,
            stakeholders TEXT,
            constraints TEXT,
            affected_system TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_status ON activities(status);
        CREATE INDEX IF NOT EXISTS idx_updated_at ON activities(updated_at DESC);
        ",
    )
    .context("Failed to create activity index schema")?;
    Ok(())
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<IndexedActivity> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };
    let status: String = row.get(3)?;
    let stakeholders = text(7)?;
    Ok(IndexedActivity {
        slug: row.get(0)?,
        title: row.get(1)?,
        description: text(2)?,
        status: status.parse().unwrap_or_default(),
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        problem: text(6)?,
        stakeholders: crate::types::activity::parse_stakeholders(&stakeholders),
        constraints: text(8)?,
        affected_system: text(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn activity(slug: &str, title: &str, updated_at: &str) -> Activity {
        Activity {
            slug: slug.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            status: ActivityStatus::InProgress,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: updated_at.to_string(),
            metadata: BTreeMap::new(),
            problem: String::new(),
            stakeholders: vec!["PO".into(), "QA".into()],
            constraints: String::new(),
            affected_system: "Portal".into(),
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let index = ActivityIndex::open_in_memory().unwrap();
        index
            .upsert(&activity("login", "Login", "2024-01-02T00:00:00+00:00"))
            .unwrap();

        let row = index.get("login").unwrap().unwrap();
        assert_eq!(row.title, "Login");
        assert_eq!(row.stakeholders, vec!["PO", "QA"]);
        assert_eq!(row.status, ActivityStatus::InProgress);
        assert!(index.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let index = ActivityIndex::open_in_memory().unwrap();
        let mut a = activity("login", "Login", "2024-01-02T00:00:00+00:00");
        index.upsert(&a).unwrap();
        a.status = ActivityStatus::Finalized;
        index.upsert(&a).unwrap();

        let rows = index.search("", None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ActivityStatus::Finalized);
    }

    #[test]
    fn test_search_orders_newest_first_and_filters_status() {
        let index = ActivityIndex::open_in_memory().unwrap();
        index
            .upsert(&activity("old", "Login antigo", "2024-01-01T00:00:00+00:00"))
            .unwrap();
        index
            .upsert(&activity("new", "Login novo", "2024-03-01T00:00:00+00:00"))
            .unwrap();
        let mut done = activity("done", "Relatórios", "2024-02-01T00:00:00+00:00");
        done.status = ActivityStatus::Finalized;
        index.upsert(&done).unwrap();

        let slugs: Vec<String> = index
            .search("login", None)
            .unwrap()
            .into_iter()
            .map(|r| r.slug)
            .collect();
        assert_eq!(slugs, vec!["new", "old"]);

        let finalized = index
            .search("", Some(ActivityStatus::Finalized))
            .unwrap();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].slug, "done");
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let index = ActivityIndex::open_in_memory().unwrap();
        index
            .upsert(&activity("desconto", "Desconto de 50%", "2024-01-02T00:00:00+00:00"))
            .unwrap();
        index
            .upsert(&activity("cupom", "Cupom 500", "2024-01-03T00:00:00+00:00"))
            .unwrap();
        index
            .upsert(&activity("snake", "campo user_id", "2024-01-04T00:00:00+00:00"))
            .unwrap();

        let slugs = |query: &str| -> Vec<String> {
            index
                .search(query, None)
                .unwrap()
                .into_iter()
                .map(|r| r.slug)
                .collect()
        };
        assert_eq!(slugs("50%"), vec!["desconto"]);
        assert_eq!(slugs("r_i"), vec!["snake"]);
        assert!(slugs("user%id").is_empty());
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_delete() {
        let index = ActivityIndex::open_in_memory().unwrap();
        index
            .upsert(&activity("login", "Login", "2024-01-02T00:00:00+00:00"))
            .unwrap();
        assert!(index.delete("login").unwrap());
        assert!(!index.delete("login").unwrap());
    }

    #[test]
    fn test_open_creates_database_file() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nested").join("refineflow.db");
        let index = ActivityIndex::open(&db_path).unwrap();
        index
            .upsert(&activity("login", "Login", "2024-01-02T00:00:00+00:00"))
            .unwrap();
        assert!(db_path.exists());

        let reopened = ActivityIndex::open(&db_path).unwrap();
        assert!(reopened.get("login").unwrap().is_some());
    }
}
