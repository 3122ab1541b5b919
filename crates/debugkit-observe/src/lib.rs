//! debugkit Observability
//!
//! This crate provides the reporting side of debugkit. Wrappers format
//! their lines and hand them to a [`Reporter`]; where the lines go is up to
//! the sink:
//!
//! - [`TracingReporter`]: forwards to `tracing` (the default)
//! - [`CollectingReporter`]: keeps lines in memory, for tests and tooling
//! - [`WriterReporter`]: writes `LEVEL message` lines to any `io::Write`
//! - [`ReportDispatcher`]: fans out to several sinks
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use debugkit_core::Severity;
//! use debugkit_observe::{CollectingReporter, Reporter, ReportDispatcher, TracingReporter};
//!
//! let collector = Arc::new(CollectingReporter::new());
//! let dispatcher = ReportDispatcher::new()
//!     .with_sink(Arc::new(TracingReporter::new()))
//!     .with_sink(collector.clone());
//!
//! dispatcher.emit(Severity::Info, "Calling add(1, 2)").unwrap();
//! assert_eq!(collector.messages(), vec!["Calling add(1, 2)"]);
//! ```

pub mod dispatch;
pub mod reporter;
pub mod sinks;

// Re-export main types
pub use dispatch::ReportDispatcher;
pub use reporter::{ReportRecord, Reporter, SharedReporter};
pub use sinks::{CollectingReporter, TracingReporter, WriterReporter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dispatch::ReportDispatcher;
    pub use crate::reporter::{Reporter, SharedReporter};
    pub use crate::sinks::{CollectingReporter, TracingReporter};
}
