//! Resource usage observation.
//!
//! Both observers always finish their post-phase before a failure leaves
//! them: the after-snapshot is taken and the report emitted even when the
//! inner call returns an error or panics. The inner failure is then passed
//! on unchanged.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use debugkit_core::{Callable, ReportError, SampleError, Severity};
use debugkit_observe::SharedReporter;
use debugkit_resource::{ResourceDelta, ResourceSampler, ResourceSnapshot, SnapshotScope};

use crate::error::ObservationError;

/// Logs the CPU percent and virtual memory deltas of each call.
pub struct ResourceObserver<C> {
    inner: C,
    reporter: SharedReporter,
    sampler: Arc<dyn ResourceSampler>,
    severity: Severity,
}

impl<C> ResourceObserver<C> {
    /// Wrap `inner`, sampling from `sampler`.
    pub fn new(inner: C, reporter: SharedReporter, sampler: Arc<dyn ResourceSampler>) -> Self {
        Self {
            inner,
            reporter,
            sampler,
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

    fn report(&self, name: &str, before: &ResourceSnapshot) -> Result<(), ObservationError> {
        let after = ResourceSnapshot::capture(&*self.sampler, SnapshotScope::Basic)?;
        let delta = after.delta_since(before);
        self.reporter.emit(
            self.severity,
            &format!(
                "Resource usage for {}: CPU: {:?}%, Memory: {} bytes",
                name, delta.cpu_percent, delta.vms_bytes
            ),
        )?;
        Ok(())
    }
}

impl<Args, C> Callable<Args> for ResourceObserver<C>
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
        let before = ResourceSnapshot::capture(&*self.sampler, SnapshotScope::Basic)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.inner.call(args)));
        let observed = self.report(self.inner.name(), &before);
        settle(self.inner.name(), outcome, observed)
    }
}

/// Logs CPU, execution time, memory, disk I/O and network I/O deltas of each
/// call, one line per category in that order.
pub struct DetailedResourceObserver<C> {
    inner: C,
    reporter: SharedReporter,
    sampler: Arc<dyn ResourceSampler>,
    severity: Severity,
}

impl<C> DetailedResourceObserver<C> {
    /// Wrap `inner`, sampling from `sampler`.
    pub fn new(inner: C, reporter: SharedReporter, sampler: Arc<dyn ResourceSampler>) -> Self {
        Self {
            inner,
            reporter,
            sampler,
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

    fn report(
        &self,
        name: &str,
        before: &ResourceSnapshot,
        elapsed: Duration,
    ) -> Result<(), ObservationError> {
        let after = ResourceSnapshot::capture(&*self.sampler, SnapshotScope::Full)?;
        let lines = detailed_lines(name, &after.delta_since(before), elapsed);
        self.reporter.emit_batch(self.severity, &lines)?;
        Ok(())
    }
}

impl<Args, C> Callable<Args> for DetailedResourceObserver<C>
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
        let before = ResourceSnapshot::capture(&*self.sampler, SnapshotScope::Full)?;
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.inner.call(args)));
        let elapsed = start.elapsed();
        let observed = self.report(self.inner.name(), &before, elapsed);
        settle(self.inner.name(), outcome, observed)
    }
}

fn detailed_lines(name: &str, delta: &ResourceDelta, elapsed: Duration) -> [String; 5] {
    [
        format!("Resource usage for {}: CPU Usage: {:?}%", name, delta.cpu_percent),
        format!(
            "Resource usage for {}: Execution Time: {:.6} seconds",
            name,
            elapsed.as_secs_f64()
        ),
        format!(
            "Resource usage for {}: Memory Usage: RSS: {} bytes, VMS: {} bytes",
            name, delta.rss_bytes, delta.vms_bytes
        ),
        format!(
            "Resource usage for {}: Disk I/O: Read: {} bytes, Write: {} bytes",
            name, delta.disk_read_bytes, delta.disk_write_bytes
        ),
        format!(
            "Resource usage for {}: Network I/O: Sent: {} bytes, Received: {} bytes",
            name, delta.net_sent_bytes, delta.net_recv_bytes
        ),
    ]
}

/// Combine the inner outcome with the post-phase result.
///
/// An inner failure (error or panic) wins over an observation failure, which
/// is then only logged.
fn settle<T, E>(
    function: &str,
    outcome: std::thread::Result<Result<T, E>>,
    observed: Result<(), ObservationError>,
) -> Result<T, E>
where
    E: From<ReportError> + From<SampleError>,
{
    match outcome {
        Ok(Ok(output)) => match observed {
            Ok(()) => Ok(output),
            Err(observation) => Err(observation.into_error()),
        },
        Ok(Err(e)) => {
            if let Err(observation) = observed {
                warn!(function, error = %observation, "Resource report lost after call failed");
            }
            Err(e)
        }
        Err(payload) => {
            if let Err(observation) = observed {
                warn!(function, error = %observation, "Resource report lost after call panicked");
            }
            panic::resume_unwind(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use debugkit_core::{Error, function, try_function};
    use debugkit_observe::CollectingReporter;
    use debugkit_resource::{DiskCounters, MemoryInfo, NetworkCounters, Reading, ScriptedSampler};

    fn reading(cpu: f64, base: u64) -> Reading {
        Reading {
            cpu_percent: cpu,
            memory: MemoryInfo {
                rss: base,
                vms: base * 10,
            },
            disk: DiskCounters {
                read_bytes: base * 2,
                write_bytes: base * 3,
            },
            network: NetworkCounters {
                sent_bytes: base * 4,
                recv_bytes: base * 5,
            },
        }
    }

    fn scripted() -> Arc<ScriptedSampler> {
        Arc::new(
            ScriptedSampler::new()
                .with_reading(reading(0.0, 100))
                .with_reading(reading(12.5, 150)),
        )
    }

    #[test]
    fn test_basic_report_line() {
        let reporter = Arc::new(CollectingReporter::new());
        let observed = ResourceObserver::new(
            function("add", |(a, b): (i32, i32)| a + b),
            reporter.clone(),
            scripted(),
        );

        assert_eq!(observed.call((1, 2)).unwrap(), 3);
        assert_eq!(
            reporter.messages(),
            vec!["Resource usage for add: CPU: 12.5%, Memory: 500 bytes"]
        );
    }

    #[test]
    fn test_basic_reports_then_propagates_error() {
        let reporter = Arc::new(CollectingReporter::new());
        let fail = try_function("fail", |(): ()| -> Result<(), Error> {
            Err(Error::Sample(SampleError::Unsupported("inner")))
        });

        let observed = ResourceObserver::new(fail, reporter.clone(), scripted());
        let err = observed.call(()).unwrap_err();

        assert!(matches!(err, Error::Sample(SampleError::Unsupported("inner"))));
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn test_basic_reports_then_resumes_panic() {
        let reporter = Arc::new(CollectingReporter::new());
        let observed = ResourceObserver::new(
            function("explode", |(): ()| -> () { panic!("boom") }),
            reporter.clone(),
            scripted(),
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| observed.call(())));
        assert!(result.is_err());
        assert_eq!(reporter.len(), 1);
        assert!(reporter.messages()[0].starts_with("Resource usage for explode:"));
    }

    #[test]
    fn test_detailed_emits_five_lines_in_order() {
        let reporter = Arc::new(CollectingReporter::new());
        let observed = DetailedResourceObserver::new(
            function("add", |(a, b): (i32, i32)| a + b),
            reporter.clone(),
            scripted(),
        );

        assert_eq!(observed.call((1, 2)).unwrap(), 3);

        let messages = reporter.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], "Resource usage for add: CPU Usage: 12.5%");
        assert!(messages[1].starts_with("Resource usage for add: Execution Time: "));
        assert!(messages[1].ends_with(" seconds"));
        assert_eq!(
            messages[2],
            "Resource usage for add: Memory Usage: RSS: 50 bytes, VMS: 500 bytes"
        );
        assert_eq!(
            messages[3],
            "Resource usage for add: Disk I/O: Read: 100 bytes, Write: 150 bytes"
        );
        assert_eq!(
            messages[4],
            "Resource usage for add: Network I/O: Sent: 200 bytes, Received: 250 bytes"
        );
    }

    #[test]
    fn test_detailed_reports_then_propagates_error() {
        let reporter = Arc::new(CollectingReporter::new());
        let fail = try_function("fail", |(): ()| -> Result<(), Error> {
            Err(Error::Sample(SampleError::Unsupported("inner")))
        });

        let observed = DetailedResourceObserver::new(fail, reporter.clone(), scripted());
        assert!(observed.call(()).is_err());
        assert_eq!(reporter.len(), 5);
    }

    #[test]
    fn test_sampler_failure_propagates_before_call() {
        let reporter = Arc::new(CollectingReporter::new());
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let observed = ResourceObserver::new(
            function("noop", move |(): ()| {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
            }),
            reporter.clone(),
            Arc::new(ScriptedSampler::unavailable()),
        );

        let err = observed.call(()).unwrap_err();
        assert!(matches!(err, Error::Sample(SampleError::Unsupported(_))));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_inner_error_wins_over_report_failure() {
        let reporter = Arc::new(CollectingReporter::with_capacity_limit(0));
        let fail = try_function("fail", |(): ()| -> Result<(), Error> {
            Err(Error::Sample(SampleError::Unsupported("inner")))
        });

        let observed = ResourceObserver::new(fail, reporter, scripted());
        let err = observed.call(()).unwrap_err();
        assert!(matches!(err, Error::Sample(SampleError::Unsupported("inner"))));
    }

    #[test]
    fn test_cpu_delta_is_not_rounded() {
        let reporter = Arc::new(CollectingReporter::new());
        let sampler = Arc::new(
            ScriptedSampler::new()
                .with_reading(reading(0.0, 100))
                .with_reading(reading(12.25, 100)),
        );
        let observed =
            ResourceObserver::new(function("noop", |(): ()| ()), reporter.clone(), sampler);

        observed.call(()).unwrap();
        assert_eq!(
            reporter.messages(),
            vec!["Resource usage for noop: CPU: 12.25%, Memory: 0 bytes"]
        );
    }

    #[test]
    fn test_detailed_report_is_never_partial() {
        let reporter = Arc::new(CollectingReporter::with_capacity_limit(2));
        let observed = DetailedResourceObserver::new(
            function("add", |(a, b): (i32, i32)| a + b),
            reporter.clone(),
            scripted(),
        );

        let err = observed.call((1, 2)).unwrap_err();
        assert!(matches!(err, Error::Report(ReportError::CapacityExceeded { limit: 2 })));
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_report_failure_surfaces_on_success() {
        let reporter = Arc::new(CollectingReporter::with_capacity_limit(0));
        let observed = ResourceObserver::new(function("noop", |(): ()| ()), reporter, scripted());

        let err = observed.call(()).unwrap_err();
        assert!(matches!(err, Error::Report(ReportError::CapacityExceeded { limit: 0 })));
    }
}
