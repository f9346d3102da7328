//! Subquery walkthrough over the CRM sample dataset.
//! Runs a fixed sequence of lesson queries on one SQLite connection.

pub mod config;
pub mod db;
pub mod logging;
pub mod query;
pub mod render;
pub mod walkthrough;

pub use config::{ConfigError, DatasetSource, OutputFormat, RawConfig, WalkthroughConfig};
pub use db::{open_dataset, open_sample_in_memory, write_sample_dataset, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, single_line, LogTarget};
pub use query::{run_query, Cell, ResultTable};
pub use render::{
    render_catalogue, render_json, render_outcome_json, render_outcome_text, render_table,
};
pub use walkthrough::{
    find_step, steps, Selection, SessionSummary, Step, StepOutcome, StepSink, Walkthrough,
    WalkthroughError, WalkthroughResult,
};
