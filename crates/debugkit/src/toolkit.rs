//! Shared wrapper configuration and stack assembly.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::debug;

use debugkit_core::{
    Arguments, BoxCallable, Callable, ConfigResult, InstrumentConfig, ReportError, SampleError,
    Severity, WrapperKind, run_count,
};
use debugkit_observe::{SharedReporter, TracingReporter};
use debugkit_resource::{GcCounter, ManualGcCounter, ProcSampler, ResourceSampler};

use crate::gc::GcObserver;
use crate::input::InputLogger;
use crate::resources::{DetailedResourceObserver, ResourceObserver};
use crate::timing::TimedRunner;

/// The reporter, samplers, severity and run count every wrapper is built with.
///
/// A toolkit is cheap to clone and can be shared between threads. Wrappers
/// created from it share its reporter and samplers.
#[derive(Clone)]
pub struct Toolkit {
    reporter: SharedReporter,
    sampler: Arc<dyn ResourceSampler>,
    gc_counter: Arc<dyn GcCounter>,
    severity: Severity,
    runs: NonZeroUsize,
}

impl Toolkit {
    /// Create a builder.
    pub fn builder() -> ToolkitBuilder {
        ToolkitBuilder::default()
    }

    /// Tracing reporter, OS sampler, info severity and a single run.
    pub fn with_defaults() -> Self {
        Self {
            reporter: Arc::new(TracingReporter::new()),
            sampler: Arc::new(ProcSampler::new()),
            gc_counter: Arc::new(ManualGcCounter::default()),
            severity: Severity::Info,
            runs: NonZeroUsize::MIN,
        }
    }

    /// Defaults with severity and run count taken from `config`.
    pub fn from_config(config: &InstrumentConfig) -> ConfigResult<Self> {
        Self::builder().with_config(config).build()
    }

    /// The shared reporter.
    pub fn reporter(&self) -> &SharedReporter {
        &self.reporter
    }

    /// The shared resource sampler.
    pub fn sampler(&self) -> &Arc<dyn ResourceSampler> {
        &self.sampler
    }

    /// The shared collector counter.
    pub fn gc_counter(&self) -> &Arc<dyn GcCounter> {
        &self.gc_counter
    }

    /// Severity of every report line.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Run count used by [`WrapperKind::Timing`] in [`Toolkit::apply`].
    pub fn runs(&self) -> usize {
        self.runs.get()
    }

    /// Wrap `inner` in an [`InputLogger`].
    pub fn log_inputs<C>(&self, inner: C) -> InputLogger<C> {
        InputLogger::new(inner, self.reporter.clone()).with_severity(self.severity)
    }

    /// Wrap `inner` in a [`TimedRunner`] running `runs` times.
    pub fn timed<C>(&self, inner: C, runs: usize) -> ConfigResult<TimedRunner<C>> {
        Ok(TimedRunner::new(inner, runs, self.reporter.clone())?.with_severity(self.severity))
    }

    /// Wrap `inner` in a [`GcObserver`].
    pub fn observe_gc<C>(&self, inner: C) -> GcObserver<C> {
        GcObserver::new(inner, self.reporter.clone(), self.gc_counter.clone())
            .with_severity(self.severity)
    }

    /// Wrap `inner` in a [`ResourceObserver`].
    pub fn monitor_resources<C>(&self, inner: C) -> ResourceObserver<C> {
        ResourceObserver::new(inner, self.reporter.clone(), self.sampler.clone())
            .with_severity(self.severity)
    }

    /// Wrap `inner` in a [`DetailedResourceObserver`].
    pub fn monitor_detailed_resources<C>(&self, inner: C) -> DetailedResourceObserver<C> {
        DetailedResourceObserver::new(inner, self.reporter.clone(), self.sampler.clone())
            .with_severity(self.severity)
    }

    /// Assemble a wrapper stack around `inner` at runtime.
    ///
    /// `stack` lists wrappers outermost first, so
    /// `[Inputs, Timing]` logs the arguments once and then times the runs.
    /// An empty stack returns `inner` boxed and unchanged.
    pub fn apply<'a, Args, C>(
        &self,
        inner: C,
        stack: &[WrapperKind],
    ) -> BoxCallable<'a, Args, C::Output, C::Error>
    where
        Args: Arguments + Clone + 'a,
        C: Callable<Args> + Send + Sync + 'a,
        C::Output: 'a,
        C::Error: From<ReportError> + From<SampleError> + 'a,
    {
        debug!(
            function = inner.name(),
            wrappers = stack.len(),
            "Assembling instrumentation stack"
        );

        let mut current: BoxCallable<'a, Args, C::Output, C::Error> = Box::new(inner);
        for kind in stack.iter().rev() {
            current = match kind {
                WrapperKind::Inputs => Box::new(self.log_inputs(current)),
                WrapperKind::Timing => Box::new(
                    TimedRunner::with_run_count(current, self.runs, self.reporter.clone())
                        .with_severity(self.severity),
                ),
                WrapperKind::Gc => Box::new(self.observe_gc(current)),
                WrapperKind::Resources => Box::new(self.monitor_resources(current)),
                WrapperKind::DetailedResources => {
                    Box::new(self.monitor_detailed_resources(current))
                }
            };
        }
        current
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("severity", &self.severity)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Toolkit`].
#[derive(Default)]
pub struct ToolkitBuilder {
    reporter: Option<SharedReporter>,
    sampler: Option<Arc<dyn ResourceSampler>>,
    gc_counter: Option<Arc<dyn GcCounter>>,
    severity: Option<Severity>,
    runs: Option<i64>,
}

impl ToolkitBuilder {
    /// Set the reporter.
    pub fn with_reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Set the resource sampler.
    pub fn with_sampler(mut self, sampler: Arc<dyn ResourceSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the collector counter.
    pub fn with_gc_counter(mut self, counter: Arc<dyn GcCounter>) -> Self {
        self.gc_counter = Some(counter);
        self
    }

    /// Set the report severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the run count for stacks assembled with [`Toolkit::apply`].
    pub fn with_runs(mut self, runs: i64) -> Self {
        self.runs = Some(runs);
        self
    }

    /// Take severity and run count from a configuration.
    pub fn with_config(self, config: &InstrumentConfig) -> Self {
        self.with_severity(config.severity).with_runs(config.runs)
    }

    /// Build the toolkit, validating the run count.
    pub fn build(self) -> ConfigResult<Toolkit> {
        let runs = match self.runs {
            Some(runs) => run_count(runs)?,
            None => NonZeroUsize::MIN,
        };

        Ok(Toolkit {
            reporter: self
                .reporter
                .unwrap_or_else(|| Arc::new(TracingReporter::new())),
            sampler: self.sampler.unwrap_or_else(|| Arc::new(ProcSampler::new())),
            gc_counter: self
                .gc_counter
                .unwrap_or_else(|| Arc::new(ManualGcCounter::default())),
            severity: self.severity.unwrap_or_default(),
            runs,
        })
    }
}

impl std::fmt::Debug for ToolkitBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitBuilder")
            .field("severity", &self.severity)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use debugkit_core::{ConfigError, Error, function};
    use debugkit_observe::CollectingReporter;
    use debugkit_resource::{Reading, ScriptedSampler};

    fn toolkit(reporter: &Arc<CollectingReporter>) -> Toolkit {
        Toolkit::builder()
            .with_reporter(reporter.clone())
            .with_sampler(Arc::new(ScriptedSampler::new().with_reading(Reading::default())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let toolkit = Toolkit::builder().build().unwrap();
        assert_eq!(toolkit.severity(), Severity::Info);
        assert_eq!(toolkit.runs(), 1);
    }

    #[test]
    fn test_builder_rejects_bad_runs() {
        let err = Toolkit::builder().with_runs(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRunCount(0)));
    }

    #[test]
    fn test_from_config() {
        let config = InstrumentConfig::new()
            .with_severity(Severity::Debug)
            .with_runs(3);
        let toolkit = Toolkit::from_config(&config).unwrap();
        assert_eq!(toolkit.severity(), Severity::Debug);
        assert_eq!(toolkit.runs(), 3);
    }

    #[test]
    fn test_apply_orders_outermost_first() {
        let reporter = Arc::new(CollectingReporter::new());
        let toolkit = Toolkit::builder()
            .with_reporter(reporter.clone())
            .with_runs(2)
            .build()
            .unwrap();

        let add = function("add", |(a, b): (i32, i32)| a + b);
        let stacked = toolkit.apply(add, &[WrapperKind::Inputs, WrapperKind::Timing]);
        assert_eq!(stacked.name(), "add");
        assert_eq!(stacked.call((1, 2)).unwrap(), 3);

        let messages = reporter.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], "Calling add(1, 2)");
        assert!(messages[1].starts_with("Execution 1 of add:"));
        assert!(messages[2].starts_with("Execution 2 of add:"));
        assert!(messages[3].starts_with("Average execution time of add:"));
    }

    #[test]
    fn test_apply_reversed_order_logs_each_run() {
        let reporter = Arc::new(CollectingReporter::new());
        let toolkit = Toolkit::builder()
            .with_reporter(reporter.clone())
            .with_runs(2)
            .build()
            .unwrap();

        let add = function("add", |(a, b): (i32, i32)| a + b);
        let stacked = toolkit.apply(add, &[WrapperKind::Timing, WrapperKind::Inputs]);
        stacked.call((1, 2)).unwrap();

        let messages = reporter.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], "Calling add(1, 2)");
        assert_eq!(messages[2], "Calling add(1, 2)");
    }

    #[test]
    fn test_apply_empty_stack_is_transparent() {
        let reporter = Arc::new(CollectingReporter::new());
        let stacked = toolkit(&reporter).apply(function("add", |(a, b): (i32, i32)| a + b), &[]);

        assert_eq!(stacked.call((2, 2)).unwrap(), 4);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_severity_flows_to_wrappers() {
        let reporter = Arc::new(CollectingReporter::new());
        let toolkit = Toolkit::builder()
            .with_reporter(reporter.clone())
            .with_severity(Severity::Warn)
            .build()
            .unwrap();

        toolkit
            .log_inputs(function("noop", |(): ()| ()))
            .call(())
            .unwrap();
        assert_eq!(reporter.records()[0].severity, Severity::Warn);
    }

    #[test]
    fn test_timed_rejects_zero() {
        let reporter = Arc::new(CollectingReporter::new());
        let err = toolkit(&reporter)
            .timed(function("noop", |(): ()| ()), 0)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidRunCount(0)));
    }

    #[test]
    fn test_full_stack_reports_every_layer() {
        let reporter = Arc::new(CollectingReporter::new());
        let stacked = toolkit(&reporter).apply(
            function("add", |(a, b): (i32, i32)| a + b),
            &WrapperKind::ALL,
        );

        let result: Result<i32, Error> = stacked.call((1, 2));
        assert_eq!(result.unwrap(), 3);

        // Inner post-phases report first. The manual collector counter never
        // moves, so there is no GC line.
        let messages = reporter.messages();
        assert_eq!(messages.len(), 8);
        assert_eq!(messages[0], "Calling add(1, 2)");
        assert!(messages[1].starts_with("Resource usage for add: CPU Usage: "));
        assert!(messages[5].starts_with("Resource usage for add: Network I/O: "));
        assert!(messages[6].starts_with("Resource usage for add: CPU: "));
        assert!(messages[7].starts_with("Execution 1 of add:"));
    }
}
