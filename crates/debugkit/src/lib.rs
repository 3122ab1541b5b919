//! # debugkit - Function Instrumentation Toolkit
//!
//! debugkit wraps any [`Callable`] in instrumentation that logs what the call
//! did, without changing what it returns.
//!
//! ## Features
//!
//! - **Input logging**: `Calling add(1, 2)` before every call, rendered
//!   without running user formatting code
//! - **Timing**: repeated runs with a per-run and average duration line
//! - **Collector activity**: a line when the collector counters moved
//! - **Resource usage**: CPU, memory, disk and network deltas per call
//! - **Composable**: wrappers nest in any order, statically or at runtime
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use debugkit::prelude::*;
//!
//! let reporter = Arc::new(CollectingReporter::new());
//! let toolkit = Toolkit::builder()
//!     .with_reporter(reporter.clone())
//!     .build()
//!     .unwrap();
//!
//! let add = function("add", |(a, b): (i32, i32)| a + b);
//! let timed = toolkit.log_inputs(toolkit.timed(add, 1).unwrap());
//!
//! assert_eq!(timed.call((1, 2)).unwrap(), 3);
//! assert_eq!(reporter.messages()[0], "Calling add(1, 2)");
//! assert!(reporter.messages()[1].starts_with("Execution 1 of add:"));
//! ```
//!
//! ## Failure Model
//!
//! Wrappers return exactly what the wrapped callable returns. A failure
//! raised by the instrumentation itself (a reporter that cannot write, a
//! sampler that cannot read) is converted into the callable's error type.
//! When both the callable and its instrumentation fail, the callable's
//! failure is returned and the other one is logged.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Your Application                     │
//! ├─────────────────────────────────────────────────────────┤
//! │                   debugkit (wrappers)                   │
//! │                    ┌─────────────────┐                  │
//! │                    │     Toolkit     │                  │
//! │                    └────────┬────────┘                  │
//! │                             │                           │
//! │  ┌──────────────┬───────────┴───────┬───────────────┐   │
//! │  │debugkit-core │ debugkit-resource │debugkit-observe│  │
//! │  │ (callables,  │ (samplers,        │ (reporters)   │   │
//! │  │  formatting) │  gc counters)     │               │   │
//! │  └──────────────┴───────────────────┴───────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod error;

pub mod gc;
pub mod input;
pub mod resources;
pub mod timing;
pub mod toolkit;

// Re-export from sub-crates
pub use debugkit_core;
pub use debugkit_observe;
pub use debugkit_resource;

pub use debugkit_core::{
    BoxCallable, Callable, ConfigError, Error, InstrumentConfig, ReportError, Result,
    SampleError, Severity, WrapperKind, function, try_function,
};
pub use gc::GcObserver;
pub use input::InputLogger;
pub use resources::{DetailedResourceObserver, ResourceObserver};
pub use timing::{TimedRunner, TimingReport, TimingSample};
pub use toolkit::{Toolkit, ToolkitBuilder};

/// Prelude module for convenient imports.
pub mod prelude {
    // Wrappers
    pub use crate::{
        DetailedResourceObserver, GcObserver, InputLogger, ResourceObserver, TimedRunner, Toolkit,
        ToolkitBuilder,
    };

    // Core types
    pub use debugkit_core::{
        ArgumentList, Arguments, BoxCallable, Callable, ConfigError, Error, InstrumentConfig,
        Named, Opaque, ReportError, SafeFormat, SampleError, Severity, WrapperKind, function,
        try_function,
    };

    // Resource types
    pub use debugkit_resource::{
        CountingAllocator, GcCounter, GcCounts, ManualGcCounter, ProcSampler, ResourceSampler,
        ScriptedSampler, SnapshotScope,
    };

    // Observability types
    pub use debugkit_observe::{
        CollectingReporter, ReportDispatcher, Reporter, SharedReporter, TracingReporter,
        WriterReporter,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_static_composition_matches_apply() {
        let nested = Arc::new(CollectingReporter::new());
        let toolkit = Toolkit::builder()
            .with_reporter(nested.clone())
            .with_runs(2)
            .build()
            .unwrap();
        let add = function("add", |(a, b): (i32, i32)| a + b);
        let stacked = toolkit.log_inputs(toolkit.timed(add, 2).unwrap());
        stacked.call((3, 4)).unwrap();

        let applied = Arc::new(CollectingReporter::new());
        let toolkit = Toolkit::builder()
            .with_reporter(applied.clone())
            .with_runs(2)
            .build()
            .unwrap();
        let add = function("add", |(a, b): (i32, i32)| a + b);
        toolkit
            .apply(add, &[WrapperKind::Inputs, WrapperKind::Timing])
            .call((3, 4))
            .unwrap();

        let strip = |lines: Vec<String>| -> Vec<String> {
            lines
                .into_iter()
                .map(|l| l.split(':').next().unwrap_or_default().to_string())
                .collect()
        };
        assert_eq!(strip(nested.messages()), strip(applied.messages()));
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _toolkit = Toolkit::with_defaults();
        let _kind = WrapperKind::Inputs;
    }
}
