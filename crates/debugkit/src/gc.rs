//! Collector counter observation.

use std::sync::Arc;

use debugkit_core::{Callable, ReportError, SampleError, Severity};
use debugkit_observe::SharedReporter;
use debugkit_resource::GcCounter;

/// Logs the collector counter vector when it changed across a call.
///
/// Nothing is forced; any activity that happened during the call is
/// observed, including activity from other threads. When the inner call
/// fails the failure propagates and no comparison is made.
pub struct GcObserver<C> {
    inner: C,
    reporter: SharedReporter,
    counter: Arc<dyn GcCounter>,
    severity: Severity,
}

impl<C> GcObserver<C> {
    /// Wrap `inner`, reading counts from `counter`.
    pub fn new(inner: C, reporter: SharedReporter, counter: Arc<dyn GcCounter>) -> Self {
        Self {
            inner,
            reporter,
            counter,
            severity: Severity::Info,
        }
    }

    /// Set the report severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// The wrapped callable.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the wrapped callable.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<Args, C> Callable<Args> for GcObserver<C>
where
    C: Callable<Args>,
    C::Error: From<ReportError> + From<SampleError>,
{
    type Output = C::Output;
    type Error = C::Error;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, args: Args) -> Result<C::Output, C::Error> {
        let before = self.counter.counts()?;
        let output = self.inner.call(args)?;
        let after = self.counter.counts()?;

        if before != after {
            self.reporter.emit(
                self.severity,
                &format!(
                    "Garbage collection counts changed for {}: Before: {}, After: {}",
                    self.inner.name(),
                    before,
                    after
                ),
            )?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use debugkit_core::{Error, function, try_function};
    use debugkit_observe::CollectingReporter;
    use debugkit_resource::ManualGcCounter;

    #[test]
    fn test_reports_when_counts_change() {
        let reporter = Arc::new(CollectingReporter::new());
        let counter = Arc::new(ManualGcCounter::default());
        let probe = Arc::clone(&counter);
        let create_objects = function("create_objects", move |(): ()| {
            probe.bump(0);
            probe.bump(0);
        });

        let observed = GcObserver::new(create_objects, reporter.clone(), counter);
        observed.call(()).unwrap();

        assert_eq!(
            reporter.messages(),
            vec!["Garbage collection counts changed for create_objects: Before: (0, 0, 0), After: (2, 0, 0)"]
        );
    }

    #[test]
    fn test_quiet_when_counts_unchanged() {
        let reporter = Arc::new(CollectingReporter::new());
        let observed = GcObserver::new(
            function("noop", |(): ()| ()),
            reporter.clone(),
            Arc::new(ManualGcCounter::default()),
        );

        observed.call(()).unwrap();
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_inner_failure_propagates_without_report() {
        let reporter = Arc::new(CollectingReporter::new());
        let counter = Arc::new(ManualGcCounter::default());
        let probe = Arc::clone(&counter);
        let fail = try_function("fail", move |(): ()| -> Result<(), Error> {
            probe.bump(2);
            Err(Error::Sample(SampleError::Unsupported("inner")))
        });

        let observed = GcObserver::new(fail, reporter.clone(), counter);
        let err = observed.call(()).unwrap_err();

        assert!(matches!(err, Error::Sample(SampleError::Unsupported("inner"))));
        assert!(reporter.is_empty());
    }
}
