//! Sequential walkthrough session.
//!
//! # Responsibility
//! - Own the step catalogue and the step selection.
//! - Run selected steps one at a time on a single connection.
//! - Close that connection exactly once when the session ends.
//!
//! # Invariants
//! - Steps run in ascending number order regardless of selection order.
//! - The first failing step stops the session; later steps never run.

pub mod step;

use crate::db::{close_dataset, DbError};
use crate::logging::single_line;
use crate::query::{run_query, ResultTable};
use log::{error, info};
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub use step::{find_step, steps, Step};

pub type WalkthroughResult<T> = Result<T, WalkthroughError>;

#[derive(Debug)]
pub enum WalkthroughError {
    Db(DbError),
    UnknownStep(u32),
    /// A step's statement was rejected or failed inside the engine.
    Query {
        step: u32,
        source: DbError,
    },
    /// The sink could not emit a step outcome.
    Output(std::io::Error),
}

impl Display for WalkthroughError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownStep(number) => write!(
                f,
                "unknown step {number}; expected one of {}",
                known_step_list()
            ),
            Self::Query { step, source } => write!(f, "step {step} failed: {source}"),
            Self::Output(err) => write!(f, "failed to write step output: {err}"),
        }
    }
}

impl Error for WalkthroughError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UnknownStep(_) => None,
            Self::Query { source, .. } => Some(source),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<DbError> for WalkthroughError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<UnknownStep> for WalkthroughError {
    fn from(value: UnknownStep) -> Self {
        Self::UnknownStep(value.0)
    }
}

impl From<std::io::Error> for WalkthroughError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

/// A step number with no catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStep(pub u32);

/// Which catalogue steps a session runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<u32>),
}

impl Selection {
    /// Builds a selection from user-supplied step numbers.
    ///
    /// An empty list selects every step. Duplicates collapse.
    ///
    /// # Errors
    /// - The first number with no catalogue entry.
    pub fn from_numbers(numbers: impl IntoIterator<Item = u32>) -> Result<Self, UnknownStep> {
        let mut selected = BTreeSet::new();
        for number in numbers {
            if find_step(number).is_none() {
                return Err(UnknownStep(number));
            }
            selected.insert(number);
        }

        if selected.is_empty() {
            return Ok(Self::All);
        }
        Ok(Self::Only(selected))
    }

    /// Resolves the selection to catalogue entries in run order.
    pub fn resolve(&self) -> Vec<&'static Step> {
        match self {
            Self::All => steps().iter().collect(),
            Self::Only(numbers) => steps()
                .iter()
                .filter(|step| numbers.contains(&step.number))
                .collect(),
        }
    }
}

/// Result of running one step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: &'static Step,
    /// `None` for connection-only steps.
    pub table: Option<ResultTable>,
    pub duration_ms: u128,
}

/// Receives step outcomes as the session produces them.
pub trait StepSink {
    fn emit(&mut self, outcome: &StepOutcome) -> WalkthroughResult<()>;
}

/// Collects outcomes in memory.
impl StepSink for Vec<StepOutcome> {
    fn emit(&mut self, outcome: &StepOutcome) -> WalkthroughResult<()> {
        self.push(outcome.clone());
        Ok(())
    }
}

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub steps_run: usize,
    pub rows_returned: usize,
}

/// A walkthrough session over one connection.
#[derive(Debug, Clone, Default)]
pub struct Walkthrough {
    selection: Selection,
}

impl Walkthrough {
    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }

    /// Runs the selected steps on `conn`, then closes it.
    ///
    /// The connection is closed even when a step fails; the step error wins
    /// over a close error in that case.
    ///
    /// # Side effects
    /// - Emits `walkthrough_run` and `step_run` logging events.
    pub fn run(
        &self,
        conn: Connection,
        sink: &mut dyn StepSink,
    ) -> WalkthroughResult<SessionSummary> {
        let started_at = Instant::now();
        info!("event=walkthrough_run module=walkthrough status=start");

        let result = self.run_steps(&conn, sink);
        let closed = close_dataset(conn);
        settle_run(started_at, result, closed)
    }

    fn run_steps(
        &self,
        conn: &Connection,
        sink: &mut dyn StepSink,
    ) -> WalkthroughResult<SessionSummary> {
        let mut summary = SessionSummary::default();
        for step in self.selection.resolve() {
            let outcome = run_step(conn, step)?;
            summary.steps_run += 1;
            summary.rows_returned += outcome.table.as_ref().map_or(0, ResultTable::row_count);
            sink.emit(&outcome)?;
        }
        Ok(summary)
    }
}

/// Runs a single step on an open connection.
pub fn run_step(conn: &Connection, step: &'static Step) -> WalkthroughResult<StepOutcome> {
    let started_at = Instant::now();
    let table = match step.sql {
        Some(sql) => Some(run_query(conn, sql).map_err(|source| WalkthroughError::Query {
            step: step.number,
            source,
        })?),
        None => None,
    };

    let duration_ms = started_at.elapsed().as_millis();
    info!(
        "event=step_run module=walkthrough status=ok step={} duration_ms={}",
        step.number, duration_ms
    );
    Ok(StepOutcome {
        step,
        table,
        duration_ms,
    })
}

/// Combines the step result with the close result into the session result.
///
/// A step error wins over a close error.
fn settle_run(
    started_at: Instant,
    result: WalkthroughResult<SessionSummary>,
    closed: Result<(), DbError>,
) -> WalkthroughResult<SessionSummary> {
    match (result, closed) {
        (Ok(summary), Ok(())) => {
            info!(
                "event=walkthrough_run module=walkthrough status=ok duration_ms={} steps={} rows={}",
                started_at.elapsed().as_millis(),
                summary.steps_run,
                summary.rows_returned
            );
            Ok(summary)
        }
        (Err(err), _) => {
            log_run_failure(started_at, &err);
            Err(err)
        }
        (Ok(_), Err(err)) => {
            let err = WalkthroughError::from(err);
            log_run_failure(started_at, &err);
            Err(err)
        }
    }
}

fn log_run_failure(started_at: Instant, err: &WalkthroughError) {
    error!(
        "event=walkthrough_run module=walkthrough status=error duration_ms={} error={}",
        started_at.elapsed().as_millis(),
        single_line(&err.to_string())
    );
}

fn known_step_list() -> String {
    steps()
        .iter()
        .map(|step| step.number.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
