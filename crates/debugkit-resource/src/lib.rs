//! debugkit Resource Sampling
//!
//! This crate provides the resource-observation side of debugkit:
//!
//! - [`ResourceSampler`]: point-in-time CPU, memory, disk and network counters
//! - [`ProcSampler`]: the operating-system backed sampler
//! - [`ResourceSnapshot`] / [`ResourceDelta`]: before/after readings and their
//!   signed difference
//! - [`GcCounter`]: the collector counter vector, backed by
//!   [`CountingAllocator`] in Rust programs
//!
//! # Sampling Strategy
//!
//! Counters are read synchronously on the caller's thread, once before and
//! once after the observed call. Nothing is aggregated across calls.
//!
//! ```ignore
//! use debugkit_resource::{ProcSampler, ResourceSnapshot, SnapshotScope};
//!
//! let sampler = ProcSampler::new();
//! let before = ResourceSnapshot::capture(&sampler, SnapshotScope::Full)?;
//! // ... work ...
//! let after = ResourceSnapshot::capture(&sampler, SnapshotScope::Full)?;
//! let delta = after.delta_since(&before);
//! ```
//!
//! ## CPU Percent
//!
//! CPU percent is measured between consecutive calls on the same sampler.
//! The first call only establishes a baseline and returns `0.0`, so deltas
//! can be negative; this is a property of the sampling convention.

pub mod gc;
pub mod procfs;
pub mod sampler;
pub mod snapshot;

// Re-export main types
pub use gc::{CountingAllocator, GcCounter, GcCounts, ManualGcCounter};
pub use procfs::ProcSampler;
pub use sampler::{
    DiskCounters, MemoryInfo, NetworkCounters, Reading, ResourceSampler, ScriptedSampler,
};
pub use snapshot::{ResourceDelta, ResourceSnapshot, SnapshotScope};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::gc::{CountingAllocator, GcCounter, GcCounts};
    pub use crate::procfs::ProcSampler;
    pub use crate::sampler::ResourceSampler;
    pub use crate::snapshot::{ResourceDelta, ResourceSnapshot, SnapshotScope};
}
