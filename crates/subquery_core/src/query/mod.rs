//! One-shot execution of literal SQL strings.
//!
//! # Responsibility
//! - Send a statement to SQLite verbatim and materialize every row.
//! - Keep column order exactly as the statement declares it.
//!
//! # Invariants
//! - No parameters are bound; the SQL text is the whole query.

pub mod table;

use crate::db::DbResult;
use crate::logging::single_line;
use log::{debug, info};
use rusqlite::Connection;
use std::time::Instant;

pub use table::{Cell, ResultTable};

/// Runs `sql` against `conn` and collects the full result.
///
/// # Errors
/// Engine errors (syntax, unknown column, ...) are returned unchanged as
/// `DbError::Sqlite`.
pub fn run_query(conn: &Connection, sql: &str) -> DbResult<ResultTable> {
    let started_at = Instant::now();
    debug!(
        "event=query_run module=query status=start sql={}",
        compact_sql(sql)
    );

    match collect_rows(conn, sql) {
        Ok(table) => {
            info!(
                "event=query_run module=query status=ok duration_ms={} columns={} rows={}",
                started_at.elapsed().as_millis(),
                table.columns.len(),
                table.row_count()
            );
            Ok(table)
        }
        Err(err) => {
            // Callers report the failure; keep this at debug to avoid repeats.
            debug!(
                "event=query_run module=query status=error duration_ms={} error_code=query_failed error={}",
                started_at.elapsed().as_millis(),
                single_line(&err.to_string())
            );
            Err(err)
        }
    }
}

/// Collapses runs of whitespace so a statement fits on one log line.
pub fn compact_sql(sql: &str) -> String {
    single_line(sql)
}

fn collect_rows(conn: &Connection, sql: &str) -> DbResult<ResultTable> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query([])?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for index in 0..width {
            cells.push(Cell::from(row.get_ref(index)?));
        }
        collected.push(cells);
    }

    Ok(ResultTable {
        columns,
        rows: collected,
    })
}
