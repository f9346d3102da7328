//! Command-line runner for the subquery walkthrough.
//!
//! # Responsibility
//! - Parse flags and environment into a validated session config.
//! - Open the dataset once, run the selected steps, close it once.
//! - Map every failure to a message on stderr and exit code 1.

mod output;

use clap::{Parser, ValueEnum};
use log::info;
use output::WriterSink;
use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use subquery_core::{
    init_logging, render_catalogue, single_line, steps, write_sample_dataset, OutputFormat,
    RawConfig, Walkthrough,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Table => Self::Table,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "subquery_walk", version)]
struct Arguments {
    /// Path to the CRM dataset file.
    #[clap(long, env = "SUBQUERY_DB", default_value = subquery_core::config::DEFAULT_DATASET_PATH)]
    db: PathBuf,
    /// Run only these steps. Repeatable; defaults to every step.
    #[clap(long = "step", value_name = "N", env = "SUBQUERY_STEPS", value_delimiter = ',')]
    steps: Vec<u32>,
    /// Output format.
    #[clap(long, value_enum, env = "SUBQUERY_FORMAT", default_value = "table")]
    format: FormatArg,
    /// Log level (trace|debug|info|warn|error|off).
    #[clap(long, env = "SUBQUERY_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[clap(long, env = "SUBQUERY_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// Print the step catalogue and exit.
    #[clap(long)]
    list: bool,
    /// Run against the bundled sample dataset instead of `--db`.
    #[clap(long, env = "SUBQUERY_SAMPLE")]
    sample: bool,
    /// Write the bundled sample dataset to a new file and exit.
    #[clap(long, value_name = "PATH", conflicts_with_all = ["list", "sample"])]
    write_sample: Option<PathBuf>,
}

fn main() {
    let args = Arguments::parse();
    if let Err(err) = run(args) {
        eprintln!("ERROR: {}", single_line(&err.to_string()));
        std::process::exit(1);
    }
}

fn run(args: Arguments) -> Result<(), Box<dyn Error>> {
    if args.list {
        let mut stdout = io::stdout().lock();
        stdout.write_all(render_catalogue(steps()).as_bytes())?;
        return Ok(());
    }

    let write_sample = args.write_sample.clone();
    let config = RawConfig {
        dataset: Some(args.db),
        use_sample: args.sample,
        steps: args.steps,
        format: args.format.into(),
        log_level: args.log_level,
        log_dir: args.log_dir,
    }
    .validate()?;

    let log_dir = config
        .log_dir
        .as_deref()
        .map(|dir| dir.to_string_lossy().into_owned());
    init_logging(config.log_level, log_dir.as_deref())?;

    if let Some(path) = write_sample {
        write_sample_dataset(&path)?;
        println!("wrote sample dataset to {}", path.display());
        return Ok(());
    }

    info!(
        "event=cli_start module=cli status=ok source={:?} selection={:?}",
        config.source, config.selection
    );

    let conn = config.source.open()?;
    let mut sink = WriterSink::new(BufWriter::new(io::stdout().lock()), config.format);
    let session = Walkthrough::new(config.selection).run(conn, &mut sink);
    let (summary, _stdout) = sink.finish_after(session)?;

    info!(
        "event=cli_done module=cli status=ok steps={} rows={}",
        summary.steps_run, summary.rows_returned
    );
    Ok(())
}
