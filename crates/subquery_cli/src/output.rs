//! Step sinks writing to a terminal or pipe.

use std::io::Write;
use subquery_core::{
    render_outcome_json, render_outcome_text, OutputFormat, StepOutcome, StepSink,
    WalkthroughError, WalkthroughResult,
};

/// Writes each outcome as soon as its step finishes.
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
    emitted: usize,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            emitted: 0,
        }
    }

    /// Closes the JSON array (if any) and flushes.
    pub fn finish(mut self) -> WalkthroughResult<W> {
        if self.format == OutputFormat::Json {
            if self.emitted == 0 {
                self.writer.write_all(b"[")?;
            }
            self.writer.write_all(b"\n]\n")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Finishes the output whatever the session result was.
    ///
    /// A session error wins over a finish error, so the JSON array is still
    /// closed when a step fails midway.
    pub fn finish_after<T>(self, session: WalkthroughResult<T>) -> WalkthroughResult<(T, W)> {
        let finished = self.finish();
        let value = session?;
        Ok((value, finished?))
    }
}

impl<W: Write> StepSink for WriterSink<W> {
    fn emit(&mut self, outcome: &StepOutcome) -> WalkthroughResult<()> {
        match self.format {
            OutputFormat::Table => {
                if self.emitted > 0 {
                    self.writer.write_all(b"\n")?;
                }
                self.writer.write_all(render_outcome_text(outcome).as_bytes())?;
            }
            OutputFormat::Json => {
                let json = render_outcome_json(outcome)
                    .map_err(|err| WalkthroughError::Output(err.into()))?;
                let separator: &[u8] = if self.emitted == 0 { b"[\n" } else { b",\n" };
                self.writer.write_all(separator)?;
                self.writer.write_all(json.as_bytes())?;
            }
        }
        self.emitted += 1;
        Ok(())
    }
}
