//! Reading sink standing in for the host's ingestion pipeline.

use std::io::Write;

use south_common::{Format, Reading, encode_into};

use crate::error::{Result, RunnerError};

/// Writes reading envelopes to an output stream.
///
/// JSON envelopes are written one per line; CBOR envelopes are written as
/// consecutive self-delimiting items.
#[derive(Debug)]
pub struct ReadingSink<W: Write> {
    writer: W,
    format: Format,
    stats: SinkStats,
}

impl ReadingSink<std::io::Stdout> {
    /// Create a sink writing to standard output.
    pub fn stdout(format: Format) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write> ReadingSink<W> {
    /// Create a new sink.
    pub fn new(writer: W, format: Format) -> Self {
        Self {
            writer,
            format,
            stats: SinkStats::default(),
        }
    }

    /// Change the serialization format for subsequent writes.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Get the running statistics.
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Write a single envelope.
    pub fn write(&mut self, reading: &Reading) -> Result<()> {
        encode_into(&mut self.writer, reading, self.format)
            .map_err(|e| RunnerError::Serialization(e.to_string()))?;
        if self.format == Format::Json {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Write the result of one poll.
    ///
    /// Failed envelopes are logged and counted; the rest are still written.
    pub fn write_batch(&mut self, readings: &[Reading]) -> BatchStats {
        let mut batch = BatchStats::default();

        for reading in readings {
            match self.write(reading) {
                Ok(()) => batch.success += 1,
                Err(e) => {
                    batch.failed += 1;
                    tracing::warn!(asset = %reading.asset, error = %e, "Failed to write reading");
                }
            }
        }

        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "Failed to flush reading output");
        }

        self.stats.polls += 1;
        self.stats.written += batch.success;
        self.stats.failed += batch.failed;
        batch
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Statistics from writing one poll's readings.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    /// Number of envelopes written.
    pub success: usize,
    /// Number of envelopes that could not be written.
    pub failed: usize,
}

impl BatchStats {
    /// Total number of attempted writes.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// Running totals over the sink's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkStats {
    pub polls: usize,
    pub written: usize,
    pub failed: usize,
}
