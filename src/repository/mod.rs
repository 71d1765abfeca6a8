//! Audit persistence for pipeline runs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::models::{AuditLogEntry, PipelineRun, RunStatus};

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors from audit persistence.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a datetime string from the database, defaulting to Unix
/// epoch on error.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|s| parse_datetime(&s))
}

/// SQLite-backed repository for pipeline runs and audit entries.
pub struct AuditRepository {
    db_path: PathBuf,
}

impl AuditRepository {
    /// Open (creating if needed) the audit database.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pipeline_runs (
                id TEXT PRIMARY KEY,
                pipeline TEXT NOT NULL,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                status TEXT NOT NULL,
                error_message TEXT,
                records_processed INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pipeline TEXT NOT NULL,
                action TEXT NOT NULL,
                message TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    /// Insert a new running record and return it.
    pub fn start_run(&self, pipeline: &str) -> Result<PipelineRun> {
        let run = PipelineRun::start(pipeline);
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO pipeline_runs (id, pipeline, started_at, completed_at, status, error_message, records_processed)
             VALUES (?1, ?2, ?3, NULL, ?4, NULL, 0)",
            params![
                run.id,
                run.pipeline,
                run.started_at.to_rfc3339(),
                run.status.as_str(),
            ],
        )?;
        Ok(run)
    }

    /// Mark a run succeeded with its processed-record count.
    pub fn complete_run(&self, run: &mut PipelineRun, records_processed: i64) -> Result<()> {
        run.status = RunStatus::Succeeded;
        run.completed_at = Some(Utc::now());
        run.records_processed = records_processed;
        self.update_run(run)
    }

    /// Mark a run failed with an error message.
    pub fn fail_run(&self, run: &mut PipelineRun, error: &str) -> Result<()> {
        run.status = RunStatus::Failed;
        run.completed_at = Some(Utc::now());
        run.error_message = Some(error.to_string());
        self.update_run(run)
    }

    fn update_run(&self, run: &PipelineRun) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE pipeline_runs
             SET completed_at = ?2, status = ?3, error_message = ?4, records_processed = ?5
             WHERE id = ?1",
            params![
                run.id,
                run.completed_at.map(|dt| dt.to_rfc3339()),
                run.status.as_str(),
                run.error_message,
                run.records_processed,
            ],
        )?;
        Ok(())
    }

    fn row_to_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<PipelineRun> {
        Ok(PipelineRun {
            id: row.get("id")?,
            pipeline: row.get("pipeline")?,
            started_at: parse_datetime(&row.get::<_, String>("started_at")?),
            completed_at: parse_datetime_opt(row.get::<_, Option<String>>("completed_at")?),
            status: RunStatus::from_str(&row.get::<_, String>("status")?)
                .unwrap_or(RunStatus::Failed),
            error_message: row.get("error_message")?,
            records_processed: row.get("records_processed")?,
        })
    }

    /// Get a run by ID.
    pub fn get_run(&self, id: &str) -> Result<Option<PipelineRun>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM pipeline_runs WHERE id = ?")?;

        match stmt.query_row(params![id], Self::row_to_run) {
            Ok(run) => Ok(Some(run)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent runs, newest first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<PipelineRun>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT * FROM pipeline_runs ORDER BY started_at DESC LIMIT ?")?;

        let runs = stmt
            .query_map(params![limit as i64], Self::row_to_run)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }

    /// Append a free-form audit entry.
    pub fn log_action(&self, pipeline: &str, action: &str, message: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO audit_log (pipeline, action, message, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![pipeline, action, message, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Most recent audit entries, newest first.
    pub fn recent_actions(&self, limit: usize) -> Result<Vec<AuditLogEntry>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT * FROM audit_log ORDER BY id DESC LIMIT ?")?;

        let entries = stmt
            .query_map(params![limit as i64], |row| {
                Ok(AuditLogEntry {
                    id: row.get("id")?,
                    pipeline: row.get("pipeline")?,
                    action: row.get("action")?,
                    message: row.get("message")?,
                    timestamp: parse_datetime(&row.get::<_, String>("timestamp")?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn repo() -> (tempfile::TempDir, AuditRepository) {
        let dir = tempdir().unwrap();
        let repo = AuditRepository::new(&dir.path().join("audit.db")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_start_and_complete_run() {
        let (_dir, repo) = repo();

        let mut run = repo.start_run("historical-lines").unwrap();
        assert_eq!(run.status, RunStatus::Running);

        repo.complete_run(&mut run, 272).unwrap();

        let stored = repo.get_run(&run.id).unwrap().unwrap();
        assert_eq!(stored.status, RunStatus::Succeeded);
        assert_eq!(stored.records_processed, 272);
        assert!(stored.completed_at.is_some());
    }

    #[test]
    fn test_fail_run_records_error() {
        let (_dir, repo) = repo();

        let mut run = repo.start_run("week-pages").unwrap();
        repo.fail_run(&mut run, "http error: timeout").unwrap();

        let stored = repo.get_run(&run.id).unwrap().unwrap();
        assert_eq!(stored.status, RunStatus::Failed);
        assert_eq!(stored.error_message.as_deref(), Some("http error: timeout"));
    }

    #[test]
    fn test_get_missing_run_is_none() {
        let (_dir, repo) = repo();
        assert!(repo.get_run("nope").unwrap().is_none());
    }

    #[test]
    fn test_recent_runs_and_actions() {
        let (_dir, repo) = repo();

        repo.start_run("a").unwrap();
        repo.start_run("b").unwrap();
        assert_eq!(repo.recent_runs(10).unwrap().len(), 2);

        repo.log_action("a", "upload", "stored 2024 CSV").unwrap();
        let actions = repo.recent_actions(10).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "upload");
    }
}
