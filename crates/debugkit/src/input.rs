//! Argument logging.

use debugkit_core::{Arguments, Callable, ReportError, Severity};
use debugkit_observe::SharedReporter;

/// Logs `Calling name(args)` once per invocation, before delegating.
///
/// Arguments are rendered with [`SafeFormat`](debugkit_core::SafeFormat), so
/// no user formatting code runs. The line is emitted whether or not the
/// inner call later fails; nothing is emitted afterwards.
pub struct InputLogger<C> {
    inner: C,
    reporter: SharedReporter,
    severity: Severity,
}

impl<C> InputLogger<C> {
    /// Wrap `inner`, reporting to `reporter` at info severity.
    pub fn new(inner: C, reporter: SharedReporter) -> Self {
        Self {
            inner,
            reporter,
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

impl<Args, C> Callable<Args> for InputLogger<C>
where
    Args: Arguments,
    C: Callable<Args>,
    C::Error: From<ReportError>,
{
    type Output = C::Output;
    type Error = C::Error;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, args: Args) -> Result<C::Output, C::Error> {
        let signature = args.to_argument_list();
        self.reporter.emit(
            self.severity,
            &format!("Calling {}({})", self.inner.name(), signature),
        )?;
        self.inner.call(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use debugkit_core::{Error, Named, Opaque, function, try_function};
    use debugkit_observe::CollectingReporter;

    #[test]
    fn test_logs_call_before_delegating() {
        let reporter = Arc::new(CollectingReporter::new());
        let probe = Arc::clone(&reporter);
        let add = function("add", move |(a, b): (i32, i32)| {
            assert_eq!(probe.messages(), vec!["Calling add(1, 2)"]);
            a + b
        });

        let logged = InputLogger::new(add, reporter.clone());
        assert_eq!(logged.call((1, 2)).unwrap(), 3);
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn test_named_arguments_follow_positional() {
        let reporter = Arc::new(CollectingReporter::new());
        let scale = function("scale", |(x, factor, label): (f64, Named<f64>, Named<&str>)| {
            let _ = label;
            x * factor.value
        });

        let logged = InputLogger::new(scale, reporter.clone());
        logged
            .call((2.0, Named::new("factor", 1.5), Named::new("label", "w")))
            .unwrap();

        assert_eq!(
            reporter.messages(),
            vec![r#"Calling scale(2.0, factor=1.5, label="w")"#]
        );
    }

    #[test]
    fn test_opaque_argument_placeholder() {
        let reporter = Arc::new(CollectingReporter::new());
        let len = function("len", |(v,): (Opaque<'_, Vec<u8>>,)| v.0.len());

        let data = vec![1u8, 2, 3];
        let logged = InputLogger::new(len, reporter.clone());
        assert_eq!(logged.call((Opaque(&data),)).unwrap(), 3);

        let message = &reporter.messages()[0];
        assert!(message.starts_with("Calling len(<Vec<u8> object at 0x"));
        assert!(message.ends_with(">)"));
    }

    #[test]
    fn test_reports_even_when_inner_fails() {
        let reporter = Arc::new(CollectingReporter::new());
        let fail = try_function("fail", |(code,): (i32,)| -> Result<(), Error> {
            Err(Error::Config(debugkit_core::ConfigError::InvalidRunCount(code.into())))
        });

        let logged = InputLogger::new(fail, reporter.clone()).with_severity(Severity::Debug);
        assert!(logged.call((7,)).is_err());
        assert_eq!(reporter.messages(), vec!["Calling fail(7)"]);
        assert_eq!(reporter.records()[0].severity, Severity::Debug);
    }

    #[test]
    fn test_reporter_failure_skips_inner_call() {
        let reporter = Arc::new(CollectingReporter::with_capacity_limit(0));
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let noop = function("noop", move |(): ()| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        let logged = InputLogger::new(noop, reporter);
        let err = logged.call(()).unwrap_err();

        assert!(matches!(err, Error::Report(ReportError::CapacityExceeded { .. })));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_name_is_delegated() {
        let reporter = Arc::new(CollectingReporter::new());
        let logged = InputLogger::new(function("inner_name", |(): ()| ()), reporter);
        assert_eq!(logged.name(), "inner_name");
    }
}
