//! Bundled CRM sample dataset.
//!
//! # Responsibility
//! - Load a trimmed copy of the CRM dataset into a fresh connection.
//! - Materialize that copy as a new file for learners without `data.sqlite`.
//!
//! # Invariants
//! - The sample is loaded atomically; a failed load leaves no partial tables.
//! - Existing files are never overwritten.

use super::open::bootstrap_connection;
use super::{DbError, DbResult};
use crate::logging::single_line;
use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

const SAMPLE_SQL: &str = include_str!("crm_sample.sql");

/// Opens an in-memory connection populated with the bundled sample.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_sample_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=sample");

    let mut conn = Connection::open_in_memory()?;
    load_sample(&mut conn)?;
    bootstrap_connection(&conn)?;

    info!(
        "event=db_open module=db status=ok mode=sample duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

/// Writes the bundled sample to a new SQLite file at `path`.
///
/// # Errors
/// - `SampleExists` when anything already exists at `path`.
/// - `Sqlite` when the file cannot be created or populated.
pub fn write_sample_dataset(path: impl AsRef<Path>) -> DbResult<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(DbError::SampleExists(path.to_path_buf()));
    }

    write_dataset(path, SAMPLE_SQL)?;
    info!(
        "event=sample_write module=db status=ok path={}",
        path.display()
    );
    Ok(())
}

/// Creates `path` and loads `sql` into it; removes the file again on failure.
fn write_dataset(path: &Path, sql: &str) -> DbResult<()> {
    let written = Connection::open(path)
        .map_err(DbError::from)
        .and_then(|mut conn| {
            load_batch(&mut conn, sql)?;
            conn.close().map_err(|(_conn, err)| DbError::Sqlite(err))
        });

    if let Err(err) = written {
        if let Err(remove_err) = std::fs::remove_file(path) {
            warn!(
                "event=sample_write module=db status=cleanup_failed path={} error={}",
                path.display(),
                single_line(&remove_err.to_string())
            );
        }
        return Err(err);
    }
    Ok(())
}

fn load_sample(conn: &mut Connection) -> DbResult<()> {
    load_batch(conn, SAMPLE_SQL)
}

fn load_batch(conn: &mut Connection, sql: &str) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{open_sample_in_memory, write_dataset, write_sample_dataset};
    use crate::db::{open_dataset, DbError};

    fn count(conn: &rusqlite::Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn sample_keeps_every_office_and_employee() {
        let conn = open_sample_in_memory().unwrap();
        assert_eq!(count(&conn, "offices"), 7);
        assert_eq!(count(&conn, "employees"), 23);
    }

    #[test]
    fn written_sample_can_be_reopened_as_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");

        write_sample_dataset(&path).unwrap();
        let conn = open_dataset(&path).unwrap();
        assert_eq!(count(&conn, "payments"), 15);
    }

    #[test]
    fn write_sample_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");
        std::fs::write(&path, b"not a database").unwrap();

        let err = write_sample_dataset(&path).unwrap_err();
        assert!(matches!(err, DbError::SampleExists(ref existing) if existing == &path));
        assert_eq!(std::fs::read(&path).unwrap(), b"not a database");
    }

    #[test]
    fn failed_load_removes_the_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");

        let err = write_dataset(&path, "CREATE TABLE offices (officeCode TEXT);\nNOT SQL;")
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
        assert!(!path.exists());

        write_sample_dataset(&path).unwrap();
        assert_eq!(count(&open_dataset(&path).unwrap(), "offices"), 7);
    }
}
