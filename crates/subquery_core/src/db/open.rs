//! Connection open/close for the dataset file.
//!
//! # Responsibility
//! - Open an existing dataset file read-only.
//! - Check the CRM tables before handing the connection out.
//! - Close the connection explicitly so close failures surface.
//!
//! # Invariants
//! - A missing path is reported as `MissingDataset`, never created.
//! - Returned connections have passed `verify_schema`.

use super::{DbError, DbResult};
use crate::logging::single_line;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Tables the walkthrough queries, in the order they are checked.
pub const REQUIRED_TABLES: &[&str] = &["offices", "employees", "customers", "payments"];

/// Opens a pre-built dataset file read-only and verifies its schema.
///
/// # Errors
/// - `MissingDataset` when `path` is not an existing file.
/// - `MissingTable` when one of [`REQUIRED_TABLES`] is absent.
/// - `Sqlite` for anything the engine reports while opening.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_dataset(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file path={}",
        path.display()
    );

    if !path.is_file() {
        error!(
            "event=db_open module=db status=error mode=file duration_ms={} error_code=dataset_missing path={}",
            started_at.elapsed().as_millis(),
            path.display()
        );
        return Err(DbError::MissingDataset(path.to_path_buf()));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                single_line(&err.to_string())
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                single_line(&err.to_string())
            );
            Err(err)
        }
    }
}

/// Checks that every table in [`REQUIRED_TABLES`] exists.
///
/// Reports the first missing table.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
    )?;

    for &table in REQUIRED_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Err(DbError::MissingTable(table));
        }
    }

    Ok(())
}

/// Closes a dataset connection, reporting any failure from SQLite.
pub fn close_dataset(conn: Connection) -> DbResult<()> {
    match conn.close() {
        Ok(()) => {
            info!("event=db_close module=db status=ok");
            Ok(())
        }
        Err((_conn, err)) => {
            error!(
                "event=db_close module=db status=error error_code=db_close_failed error={}",
                single_line(&err.to_string())
            );
            Err(err.into())
        }
    }
}

pub(super) fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    verify_schema(conn)
}
