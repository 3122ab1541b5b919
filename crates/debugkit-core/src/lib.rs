//! debugkit Core - callable model for function instrumentation
//!
//! This crate provides the building blocks shared by every debugkit crate:
//!
//! - [`Callable`]: a named unit of behavior that wrappers nest around
//! - [`SafeFormat`] and [`ArgumentList`]: argument rendering that never runs
//!   user formatting code
//! - [`InstrumentConfig`]: severity, run count and wrapper stack
//! - The error hierarchy ([`Error`], [`ConfigError`], [`ReportError`],
//!   [`SampleError`])
//!
//! # Quick Start
//!
//! ```
//! use debugkit_core::prelude::*;
//!
//! let add = function("add", |(a, b): (i32, i32)| a + b);
//! assert_eq!(add.call((1, 2)).unwrap(), 3);
//! assert_eq!((1, 2).to_argument_list().to_string(), "1, 2");
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Application                │
//! ├─────────────────────────────────────────┤
//! │          debugkit (wrappers)            │
//! ├─────────────────────────────────────────┤
//! │ debugkit-core │ -resource │ -observe    │
//! └─────────────────────────────────────────┘
//! ```

pub mod callable;
pub mod config;
pub mod error;
pub mod format;

// Re-export main types at crate root
pub use callable::{BoxCallable, Callable, Function, TryFunction, function, try_function};
pub use config::{InstrumentConfig, Severity, WrapperKind, run_count};
pub use error::{
    ConfigError, ConfigResult, Error, ReportError, ReportResult, Result, SampleError, SampleResult,
};
pub use format::{ArgumentList, Arguments, Named, Opaque, SafeFormat, placeholder};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use debugkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callable::{Callable, function, try_function};
    pub use crate::config::{InstrumentConfig, Severity, WrapperKind};
    pub use crate::error::{ConfigError, Error, ReportError, SampleError};
    pub use crate::format::{ArgumentList, Arguments, Named, Opaque, SafeFormat};
}
