//! Built-in reporter implementations.

use std::io::Write;

use parking_lot::{Mutex, RwLock};

use debugkit_core::{ReportError, ReportResult, Severity};

use crate::reporter::{ReportRecord, Reporter};

/// Forwards every line to `tracing` under the `debugkit` target.
///
/// This is the default sink; where the lines end up is decided by the
/// subscriber the application installs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a tracing reporter.
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()> {
        match severity {
            Severity::Trace => tracing::trace!(target: "debugkit", "{}", message),
            Severity::Debug => tracing::debug!(target: "debugkit", "{}", message),
            Severity::Info => tracing::info!(target: "debugkit", "{}", message),
            Severity::Warn => tracing::warn!(target: "debugkit", "{}", message),
            Severity::Error => tracing::error!(target: "debugkit", "{}", message),
        }
        Ok(())
    }
}

/// Retains emitted lines in memory for later inspection.
pub struct CollectingReporter {
    records: RwLock<Vec<ReportRecord>>,
    max_records: Option<usize>,
}

impl CollectingReporter {
    /// Create an unbounded collecting reporter.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_records: None,
        }
    }

    /// Create a reporter that refuses lines once `max_records` are held.
    pub fn with_capacity_limit(max_records: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_records: Some(max_records),
        }
    }

    /// Get collected records.
    pub fn records(&self) -> Vec<ReportRecord> {
        self.records.read().clone()
    }

    /// Get collected messages without their severities.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .read()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Clear collected records.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Get record count.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for CollectingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for CollectingReporter {
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()> {
        let mut records = self.records.write();
        if let Some(limit) = self.max_records {
            if records.len() >= limit {
                return Err(ReportError::CapacityExceeded { limit });
            }
        }
        records.push(ReportRecord::new(severity, message));
        Ok(())
    }

    fn emit_batch(&self, severity: Severity, messages: &[String]) -> ReportResult<()> {
        let mut records = self.records.write();
        if let Some(limit) = self.max_records {
            if records.len() + messages.len() > limit {
                return Err(ReportError::CapacityExceeded { limit });
            }
        }
        records.extend(messages.iter().map(|m| ReportRecord::new(severity, m.as_str())));
        Ok(())
    }
}

impl std::fmt::Debug for CollectingReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectingReporter")
            .field("len", &self.len())
            .field("max_records", &self.max_records)
            .finish()
    }
}

/// Writes one `LEVEL message` line per emission to an [`std::io::Write`].
pub struct WriterReporter<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterReporter<W> {
    /// Create a reporter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Reporter for WriterReporter<W> {
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", ReportRecord::new(severity, message))?;
        writer.flush()?;
        Ok(())
    }

    fn emit_batch(&self, severity: Severity, messages: &[String]) -> ReportResult<()> {
        // One write, so a batch is never interleaved with other emitters
        let mut text = String::new();
        for message in messages {
            text.push_str(&ReportRecord::new(severity, message.as_str()).to_string());
            text.push('\n');
        }
        let mut writer = self.writer.lock();
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl<W> std::fmt::Debug for WriterReporter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterReporter").finish_non_exhaustive()
    }
}
