//! The reporting contract wrappers emit through.

use std::sync::Arc;

use serde::Serialize;

use debugkit_core::{ReportResult, Severity};

/// Sink for formatted instrumentation lines.
///
/// Reporters are shared between wrappers and threads and synchronize
/// internally where they need to.
pub trait Reporter: Send + Sync {
    /// Emit one line at `severity`.
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()>;

    /// Emit several lines as one report: either every line is accepted or
    /// none is.
    ///
    /// The provided method emits line by line, which only holds for sinks
    /// that cannot fail. Sinks that can refuse a line override it.
    fn emit_batch(&self, severity: Severity, messages: &[String]) -> ReportResult<()> {
        for message in messages {
            self.emit(severity, message)?;
        }
        Ok(())
    }
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()> {
        (**self).emit(severity, message)
    }

    fn emit_batch(&self, severity: Severity, messages: &[String]) -> ReportResult<()> {
        (**self).emit_batch(severity, messages)
    }
}

impl<T: Reporter + ?Sized> Reporter for Arc<T> {
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()> {
        (**self).emit(severity, message)
    }

    fn emit_batch(&self, severity: Severity, messages: &[String]) -> ReportResult<()> {
        (**self).emit_batch(severity, messages)
    }
}

/// A shared, type-erased reporter.
pub type SharedReporter = Arc<dyn Reporter>;

/// One emitted line, as retained by collecting sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    /// Severity the line was emitted at.
    pub severity: Severity,
    /// The formatted line.
    pub message: String,
}

impl ReportRecord {
    /// Create a record.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<5} {}", self.severity.as_str().to_ascii_uppercase(), self.message)
    }
}
