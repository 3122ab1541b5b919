//! Repeated, timed execution.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use debugkit_core::{Callable, ConfigResult, ReportError, Severity, run_count};
use debugkit_observe::SharedReporter;

/// Wall-clock duration of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSample {
    /// 1-based run index.
    pub run_index: usize,
    /// Measured duration.
    pub duration: Duration,
}

impl TimingSample {
    /// Duration in seconds.
    pub fn seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Samples of one batch, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingReport {
    samples: Vec<TimingSample>,
}

impl TimingReport {
    fn with_capacity(runs: usize) -> Self {
        Self {
            samples: Vec::with_capacity(runs),
        }
    }

    /// Samples in run order.
    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    /// Sum of all durations.
    pub fn total(&self) -> Duration {
        self.samples.iter().map(|s| s.duration).sum()
    }

    /// Arithmetic mean in seconds, present only for batches of more than one run.
    pub fn mean_seconds(&self) -> Option<f64> {
        if self.samples.len() > 1 {
            Some(self.total().as_secs_f64() / self.samples.len() as f64)
        } else {
            None
        }
    }
}

/// Runs the inner callable `N` times in sequence and logs each run's duration.
///
/// Every run receives a clone of the same arguments. The last run's output is
/// returned. For `N > 1` an average line follows the per-run lines. A failing
/// run propagates immediately: later runs are skipped and no average is
/// emitted, though lines for completed runs have already been reported.
pub struct TimedRunner<C> {
    inner: C,
    runs: NonZeroUsize,
    reporter: SharedReporter,
    severity: Severity,
}

impl<C> TimedRunner<C> {
    /// Wrap `inner` to run `runs` times.
    ///
    /// Fails with [`ConfigError::InvalidRunCount`](debugkit_core::ConfigError::InvalidRunCount)
    /// when `runs` is zero.
    pub fn new(inner: C, runs: usize, reporter: SharedReporter) -> ConfigResult<Self> {
        let runs = NonZeroUsize::new(runs)
            .ok_or(debugkit_core::ConfigError::InvalidRunCount(0))?;
        Ok(Self::with_run_count(inner, runs, reporter))
    }

    /// Wrap `inner` with a run count from untrusted input.
    pub fn from_signed(inner: C, runs: i64, reporter: SharedReporter) -> ConfigResult<Self> {
        Ok(Self::with_run_count(inner, run_count(runs)?, reporter))
    }

    /// Wrap `inner` with an already validated run count.
    pub fn with_run_count(inner: C, runs: NonZeroUsize, reporter: SharedReporter) -> Self {
        Self {
            inner,
            runs,
            reporter,
            severity: Severity::Info,
        }
    }

    /// Set the report severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Configured number of runs.
    pub fn runs(&self) -> usize {
        self.runs.get()
    }

    /// The wrapped callable.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the wrapped callable.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Run the batch and return the last output with every sample.
    pub fn run_batch<Args>(&self, args: Args) -> Result<(C::Output, TimingReport), C::Error>
    where
        Args: Clone,
        C: Callable<Args>,
        C::Error: From<ReportError>,
    {
        let runs = self.runs.get();
        let mut report = TimingReport::with_capacity(runs);

        for run_index in 1..runs {
            self.run_once(run_index, args.clone(), &mut report)?;
        }
        let output = self.run_once(runs, args, &mut report)?;

        if let Some(mean) = report.mean_seconds() {
            self.reporter.emit(
                self.severity,
                &format!(
                    "Average execution time of {}: {:.6} seconds",
                    self.inner.name(),
                    mean
                ),
            )?;
        }

        Ok((output, report))
    }

    fn run_once<Args>(
        &self,
        run_index: usize,
        args: Args,
        report: &mut TimingReport,
    ) -> Result<C::Output, C::Error>
    where
        C: Callable<Args>,
        C::Error: From<ReportError>,
    {
        let start = Instant::now();
        let output = self.inner.call(args)?;
        let sample = TimingSample {
            run_index,
            duration: start.elapsed(),
        };
        report.samples.push(sample);

        self.reporter.emit(
            self.severity,
            &format!(
                "Execution {} of {}: {:.6} seconds",
                run_index,
                self.inner.name(),
                sample.seconds()
            ),
        )?;
        Ok(output)
    }
}

impl<Args, C> Callable<Args> for TimedRunner<C>
where
    Args: Clone,
    C: Callable<Args>,
    C::Error: From<ReportError>,
{
    type Output = C::Output;
    type Error = C::Error;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, args: Args) -> Result<C::Output, C::Error> {
        self.run_batch(args).map(|(output, _)| output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use debugkit_core::{ConfigError, Error, SampleError, function, try_function};
    use debugkit_observe::CollectingReporter;

    #[test]
    fn test_three_runs_emit_four_lines() {
        let reporter = Arc::new(CollectingReporter::new());
        let add = function("add", |(a, b): (i32, i32)| {
            std::thread::sleep(Duration::from_millis(10));
            a + b
        });

        let timed = TimedRunner::new(add, 3, reporter.clone()).unwrap();
        let (output, report) = timed.run_batch((1, 2)).unwrap();

        assert_eq!(output, 3);
        assert_eq!(report.samples().len(), 3);
        assert!(report.samples().iter().all(|s| s.duration >= Duration::from_millis(10)));

        let messages = reporter.messages();
        assert_eq!(messages.len(), 4);
        for (i, message) in messages.iter().take(3).enumerate() {
            assert!(message.starts_with(&format!("Execution {} of add: ", i + 1)));
            assert!(message.ends_with(" seconds"));
        }
        assert!(messages[3].starts_with("Average execution time of add: "));
    }

    #[test]
    fn test_single_run_has_no_average() {
        let reporter = Arc::new(CollectingReporter::new());
        let timed = TimedRunner::new(function("add", |(a, b): (i32, i32)| a + b), 1, reporter.clone())
            .unwrap();

        assert_eq!(timed.call((1, 2)).unwrap(), 3);

        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Execution 1 of add:"));
    }

    #[test]
    fn test_duration_has_six_decimals() {
        let reporter = Arc::new(CollectingReporter::new());
        let timed = TimedRunner::new(function("noop", |(): ()| ()), 1, reporter.clone()).unwrap();
        timed.call(()).unwrap();

        let message = &reporter.messages()[0];
        let value = message
            .trim_start_matches("Execution 1 of noop: ")
            .trim_end_matches(" seconds");
        let (_, decimals) = value.split_once('.').unwrap();
        assert_eq!(decimals.len(), 6);
    }

    #[test]
    fn test_returns_last_run_output() {
        let reporter = Arc::new(CollectingReporter::new());
        let counter = AtomicUsize::new(0);
        let next = function("next", move |(): ()| counter.fetch_add(1, Ordering::SeqCst) + 1);

        let timed = TimedRunner::new(next, 4, reporter).unwrap();
        assert_eq!(timed.call(()).unwrap(), 4);
    }

    #[test]
    fn test_zero_runs_rejected_at_wrap_time() {
        let reporter = Arc::new(CollectingReporter::new());
        let err = TimedRunner::new(function("f", |(): ()| ()), 0, reporter.clone())
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidRunCount(0)));

        let err = TimedRunner::from_signed(function("f", |(): ()| ()), -2, reporter)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidRunCount(-2)));
    }

    #[test]
    fn test_failure_stops_batch_without_average() {
        let reporter = Arc::new(CollectingReporter::new());
        let calls = AtomicUsize::new(0);
        let flaky = try_function("flaky", move |(): ()| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 {
                Err(Error::Sample(SampleError::Unsupported("test")))
            } else {
                Ok(n)
            }
        });

        let timed = TimedRunner::new(flaky, 3, reporter.clone()).unwrap();
        let err = timed.call(()).unwrap_err();

        assert!(matches!(err, Error::Sample(SampleError::Unsupported("test"))));
        assert_eq!(reporter.messages().len(), 1);
        assert!(reporter.messages()[0].starts_with("Execution 1 of flaky:"));
    }

    #[test]
    fn test_timing_report_mean() {
        let report = TimingReport {
            samples: vec![
                TimingSample {
                    run_index: 1,
                    duration: Duration::from_millis(100),
                },
                TimingSample {
                    run_index: 2,
                    duration: Duration::from_millis(300),
                },
            ],
        };
        assert_eq!(report.total(), Duration::from_millis(400));
        assert!((report.mean_seconds().unwrap() - 0.2).abs() < 1e-9);

        let single = TimingReport {
            samples: vec![TimingSample {
                run_index: 1,
                duration: Duration::from_millis(5),
            }],
        };
        assert!(single.mean_seconds().is_none());
    }
}
