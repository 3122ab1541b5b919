//! Core error types for debugkit.
//!
//! This module defines the error hierarchy shared by every debugkit crate.
//! Errors are split by where they originate: misconfiguration caught while
//! building a wrapper, and observation failures raised by the sampling and
//! reporting collaborators while a wrapped call is in flight.
//!
//! Failures of the wrapped callable itself are never represented here; they
//! travel through the callable's own error type untouched.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for debugkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A wrapper or toolkit was misconfigured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A reporter failed to accept a message.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// A resource sampler or GC counter failed to produce a reading.
    #[error("Sample error: {0}")]
    Sample(#[from] SampleError),
}

/// Misconfiguration detected while constructing a wrapper.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The run count of a timed runner was not a positive integer.
    #[error("Invalid run count {0}: must be a positive integer")]
    InvalidRunCount(i64),

    /// A configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A configuration value was out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A configuration file could not be read.
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the external reporting facility.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the message to the underlying sink failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink refused the message because it is full.
    #[error("Reporter capacity exceeded: limit is {limit} messages")]
    CapacityExceeded {
        /// Maximum number of messages the sink accepts.
        limit: usize,
    },
}

/// Failure of the external resource-sampling facility.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The platform does not expose the requested counter.
    #[error("Resource sampling is not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// Reading a counter source failed.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// The counter source that was being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A counter source had an unexpected layout.
    #[error("Malformed counter data in '{}': {detail}", path.display())]
    Parse {
        /// The counter source that was being parsed.
        path: PathBuf,
        /// What was wrong with it.
        detail: String,
    },

    /// An operating system call failed.
    #[error("System call '{call}' failed: {source}")]
    Os {
        /// Name of the failing call.
        call: &'static str,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for debugkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for reporter operations.
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Result type alias for sampling operations.
pub type SampleResult<T> = std::result::Result<T, SampleError>;
