//! Fan-out of report lines to several sinks.

use std::sync::Arc;

use parking_lot::RwLock;

use debugkit_core::{ReportResult, Severity};

use crate::reporter::Reporter;

/// A reporter that forwards every line to each registered sink.
///
/// Every sink sees every line, even when an earlier sink fails; the first
/// failure is returned once all sinks were tried.
#[derive(Default)]
pub struct ReportDispatcher {
    sinks: RwLock<Vec<Arc<dyn Reporter>>>,
}

impl ReportDispatcher {
    /// Create a dispatcher with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn subscribe(&self, sink: Arc<dyn Reporter>) {
        self.sinks.write().push(sink);
    }

    /// Add a sink, builder style.
    pub fn with_sink(self, sink: Arc<dyn Reporter>) -> Self {
        self.subscribe(sink);
        self
    }

    /// Remove all sinks.
    pub fn clear_sinks(&self) {
        self.sinks.write().clear();
    }

    /// Get sink count.
    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    fn each_sink<F>(&self, mut f: F) -> ReportResult<()>
    where
        F: FnMut(&dyn Reporter) -> ReportResult<()>,
    {
        let sinks = self.sinks.read();
        let mut first_error = None;
        for sink in sinks.iter() {
            if let Err(e) = f(sink.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Reporter for ReportDispatcher {
    fn emit(&self, severity: Severity, message: &str) -> ReportResult<()> {
        self.each_sink(|sink| sink.emit(severity, message))
    }

    fn emit_batch(&self, severity: Severity, messages: &[String]) -> ReportResult<()> {
        self.each_sink(|sink| sink.emit_batch(severity, messages))
    }
}

impl std::fmt::Debug for ReportDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportDispatcher")
            .field("sink_count", &self.sink_count())
            .finish()
    }
}
