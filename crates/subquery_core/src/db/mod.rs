//! SQLite dataset access for the walkthrough.
//!
//! # Responsibility
//! - Open the pre-built CRM dataset file without ever creating it.
//! - Confirm the tables the walkthrough reads are present.
//! - Provide the bundled sample dataset for offline runs and tests.
//!
//! # Invariants
//! - Dataset files are opened read-only; the walkthrough never writes to them.
//! - No query runs before `verify_schema` succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod sample;

pub use open::{close_dataset, open_dataset, verify_schema, REQUIRED_TABLES};
pub use sample::{open_sample_in_memory, write_sample_dataset};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Dataset path does not point at an existing file.
    MissingDataset(PathBuf),
    /// Dataset opened but lacks one of the CRM tables.
    MissingTable(&'static str),
    /// Refused to overwrite an existing file with the bundled sample.
    SampleExists(PathBuf),
    Io(std::io::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::MissingDataset(path) => {
                write!(f, "dataset file `{}` does not exist", path.display())
            }
            Self::MissingTable(table) => {
                write!(f, "dataset is missing required table `{table}`")
            }
            Self::SampleExists(path) => write!(
                f,
                "refusing to overwrite existing file `{}` with the sample dataset",
                path.display()
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::MissingDataset(_) | Self::MissingTable(_) | Self::SampleExists(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
