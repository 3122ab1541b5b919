//! Configuration types for debugkit.
//!
//! This module provides the configuration consumed by the toolkit when it
//! builds wrappers: the severity reports are emitted at, the run count for
//! timed execution, and an ordered wrapper stack.

use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Severity attached to every report line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Trace level (most verbose).
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl Severity {
    /// Get the level name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(ConfigError::Invalid(format!("unknown severity '{}'", other))),
        }
    }
}

/// The wrapper variants a stack can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperKind {
    /// Log the call's arguments before delegating.
    Inputs,
    /// Run the call repeatedly and log each run's duration.
    Timing,
    /// Log changes to the GC counter vector.
    Gc,
    /// Log CPU and VMS deltas.
    Resources,
    /// Log CPU, time, memory, disk and network deltas.
    DetailedResources,
}

impl WrapperKind {
    /// All wrapper kinds, in declaration order.
    pub const ALL: [WrapperKind; 5] = [
        WrapperKind::Inputs,
        WrapperKind::Timing,
        WrapperKind::Gc,
        WrapperKind::Resources,
        WrapperKind::DetailedResources,
    ];

    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapperKind::Inputs => "inputs",
            WrapperKind::Timing => "timing",
            WrapperKind::Gc => "gc",
            WrapperKind::Resources => "resources",
            WrapperKind::DetailedResources => "detailed_resources",
        }
    }
}

impl std::fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WrapperKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        WrapperKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown wrapper kind '{}'", s)))
    }
}

/// Validate a run count coming from user input.
///
/// Zero and negative counts are rejected.
pub fn run_count(runs: i64) -> ConfigResult<NonZeroUsize> {
    usize::try_from(runs)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(ConfigError::InvalidRunCount(runs))
}

/// Configuration for an instrumentation stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentConfig {
    /// Severity every report line is emitted at.
    ///
    /// Defaults to info.
    pub severity: Severity,

    /// Number of sequential runs for the timing wrapper.
    ///
    /// Defaults to 1. Must be positive.
    pub runs: i64,

    /// Wrappers to apply, outermost first.
    ///
    /// Defaults to empty (the callable runs uninstrumented).
    pub stack: Vec<WrapperKind>,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Info,
            runs: 1,
            stack: Vec::new(),
        }
    }
}

impl InstrumentConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the timing run count.
    pub fn with_runs(mut self, runs: i64) -> Self {
        self.runs = runs;
        self
    }

    /// Append a wrapper to the stack (innermost so far).
    pub fn with_wrapper(mut self, kind: WrapperKind) -> Self {
        self.stack.push(kind);
        self
    }

    /// Replace the wrapper stack.
    pub fn with_stack(mut self, stack: impl IntoIterator<Item = WrapperKind>) -> Self {
        self.stack = stack.into_iter().collect();
        self
    }

    /// The validated run count.
    pub fn run_count(&self) -> ConfigResult<NonZeroUsize> {
        run_count(self.runs)
    }

    /// Check the configuration for misconfiguration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.run_count()?;
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            runs = config.runs,
            wrappers = config.stack.len(),
            "Loaded instrumentation config"
        );
        Ok(config)
    }
}
