use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::report::{MutationTestingReport, Project};
use crate::slug::ReportKey;

/// Storage seam the report service depends on: two lookups and one upsert.
pub trait ReportStorage: Send + Sync {
    fn find_project(&self, name: &str) -> anyhow::Result<Option<Project>>;
    fn find_report(&self, key: &ReportKey) -> anyhow::Result<Option<MutationTestingReport>>;
    /// Insert-or-merge: a full replace of the record stored under the
    /// report's key. Atomic per key (single statement).
    fn upsert_report(&self, report: &MutationTestingReport) -> anyhow::Result<()>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

// The absent module is stored as '' rather than NULL: SQLite does not
// enforce NOT NULL on non-INTEGER primary key columns, and NULLs in the key
// would make every no-module write a fresh row.
fn module_column(module_name: &Option<String>) -> &str {
    module_name.as_deref().unwrap_or("")
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS projects (
                name TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                api_key_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reports (
                project_name TEXT NOT NULL,
                version TEXT NOT NULL,
                module_name TEXT NOT NULL DEFAULT '',
                mutation_score REAL NOT NULL,
                result TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (project_name, version, module_name)
            );

            CREATE INDEX IF NOT EXISTS idx_reports_project ON reports(project_name);
        ",
        )?;
        Ok(())
    }

    /// Create a project, or rotate its key and owner if it already exists.
    pub fn create_project(&self, project: &Project) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO projects (name, owner, enabled, api_key_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                owner = excluded.owner,
                enabled = excluded.enabled,
                api_key_hash = excluded.api_key_hash",
            params![
                project.name,
                project.owner,
                project.enabled as i64,
                project.api_key_hash,
                now,
            ],
        )?;
        Ok(())
    }
}

impl ReportStorage for SqliteStore {
    fn find_project(&self, name: &str) -> anyhow::Result<Option<Project>> {
        let conn = self.conn.lock().unwrap();
        let project = conn
            .query_row(
                "SELECT name, owner, enabled, api_key_hash FROM projects WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Project {
                        name: row.get(0)?,
                        owner: row.get(1)?,
                        enabled: row.get::<_, i64>(2)? != 0,
                        api_key_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(project)
    }

    fn find_report(&self, key: &ReportKey) -> anyhow::Result<Option<MutationTestingReport>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT mutation_score, result FROM reports
                 WHERE project_name = ?1 AND version = ?2 AND module_name = ?3",
                params![key.project_name, key.version, module_column(&key.module_name)],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                    ))
                },
            )
            .optional()?;

        let Some((mutation_score, result_json)) = row else {
            return Ok(None);
        };
        let result = result_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(Some(MutationTestingReport {
            project_name: key.project_name.clone(),
            version: key.version.clone(),
            module_name: key.module_name.clone(),
            mutation_score,
            result,
        }))
    }

    fn upsert_report(&self, report: &MutationTestingReport) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let result_json = report
            .result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO reports (project_name, version, module_name, mutation_score, result, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(project_name, version, module_name) DO UPDATE SET
                mutation_score = excluded.mutation_score,
                result = excluded.result,
                updated_at = excluded.updated_at",
            params![
                report.project_name,
                report.version,
                module_column(&report.module_name),
                report.mutation_score,
                result_json,
                now,
            ],
        )?;
        Ok(())
    }
}
