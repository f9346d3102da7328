//! Text and JSON rendering of result tables.
//!
//! # Responsibility
//! - Print results the way a learner expects from a dataframe view: a row
//!   index, headers, right-aligned columns.
//! - Provide a machine-readable JSON form of the same table.

use crate::query::{Cell, ResultTable};
use crate::walkthrough::{Step, StepOutcome};
use serde::Serialize;

const REAL_DECIMALS: usize = 6;
const COLUMN_GAP: &str = "  ";

/// Renders `table` as aligned text with a leading 0-based row index.
///
/// Empty results render the header line followed by `(0 rows)`.
pub fn render_table(table: &ResultTable) -> String {
    let index_labels: Vec<String> = (0..table.row_count()).map(|i| i.to_string()).collect();
    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let index_width = index_labels.iter().map(|label| label.len()).max().unwrap_or(0);
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            body.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(
        &mut out,
        &" ".repeat(index_width),
        table.columns.iter().map(String::as_str),
        &widths,
    );

    if body.is_empty() {
        out.push_str("(0 rows)\n");
        return out;
    }

    for (label, row) in index_labels.iter().zip(&body) {
        let padded_label = format!("{label:<index_width$}");
        push_line(&mut out, &padded_label, row.iter().map(String::as_str), &widths);
    }
    out
}

/// Renders `table` as a JSON object with `columns` and `rows`.
pub fn render_json(table: &ResultTable) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(table)
}

/// JSON shape of one step outcome.
#[derive(Debug, Serialize)]
struct StepReport<'a> {
    step: u32,
    title: &'a str,
    sql: Option<&'a str>,
    duration_ms: u128,
    result: Option<&'a ResultTable>,
}

/// Renders a step outcome, SQL included, as one JSON object.
pub fn render_outcome_json(outcome: &StepOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StepReport {
        step: outcome.step.number,
        title: outcome.step.title,
        sql: outcome.step.sql,
        duration_ms: outcome.duration_ms,
        result: outcome.table.as_ref(),
    })
}

/// Renders a step outcome for a learner: heading, lesson, SQL, then the table.
pub fn render_outcome_text(outcome: &StepOutcome) -> String {
    let step = outcome.step;
    let mut out = format!("Step {} - {}\n{}\n", step.number, step.title, step.lesson);
    if let Some(sql) = step.sql {
        out.push('\n');
        out.push_str(sql.trim_end());
        out.push('\n');
    }
    if let Some(table) = &outcome.table {
        out.push('\n');
        out.push_str(&render_table(table));
        out.push_str(&format!("({} ms)\n", outcome.duration_ms));
    }
    out
}

/// Renders the step catalogue as `number  title` lines.
pub fn render_catalogue(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|step| {
            let kind = if step.is_query() { "" } else { " (no query)" };
            format!("{:>2}  {}{}\n", step.number, step.title, kind)
        })
        .collect()
}

/// Formats one cell the way the text table shows it.
pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Null => "None".to_string(),
        Cell::Integer(value) => value.to_string(),
        Cell::Real(value) => format_real(*value),
        Cell::Text(value) => value.replace(['\n', '\r'], " "),
        Cell::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
    }
}

fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.prec$}", prec = REAL_DECIMALS);
    let trimmed = fixed.trim_end_matches('0');
    match trimmed.strip_suffix('.') {
        Some(whole) => format!("{whole}.0"),
        None => trimmed.to_string(),
    }
}

fn push_line<'a>(
    out: &mut String,
    index: &str,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) {
    let mut line = String::from(index);
    for (cell, width) in cells.zip(widths) {
        line.push_str(COLUMN_GAP);
        let pad = width.saturating_sub(cell.chars().count());
        line.push_str(&" ".repeat(pad));
        line.push_str(cell);
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
