//! Built-in workloads the CLI can instrument.

use std::fs::{self, File};
use std::hint::black_box;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use debugkit::prelude::*;

/// Failure of a workload, or of the instrumentation around it.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// The workload reported failure on purpose.
    #[error("workload failed: {0}")]
    Failed(String),

    /// An argument was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// File I/O inside the workload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Available workloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    /// Add two integers
    Add,
    /// Sleep for a number of seconds
    Sleep,
    /// Busy-loop for a number of iterations
    Spin,
    /// Allocate and drop a number of buffers
    Alloc,
    /// Write bytes to a temporary file
    Write,
    /// Fail with a message
    Fail,
}

impl Workload {
    /// Get the workload name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Workload::Add => "add",
            Workload::Sleep => "sleep",
            Workload::Spin => "spin",
            Workload::Alloc => "alloc",
            Workload::Write => "write",
            Workload::Fail => "fail",
        }
    }

    /// Positional arguments with their defaults.
    pub fn synopsis(&self) -> &'static str {
        match self {
            Workload::Add => "[A=1] [B=2]",
            Workload::Sleep => "[SECONDS=0.1]",
            Workload::Spin => "[ITERATIONS=10000000]",
            Workload::Alloc => "[COUNT=1000] [SIZE=1024]",
            Workload::Write => "[BYTES=1048576]",
            Workload::Fail => "[MESSAGE=requested failure]",
        }
    }

    /// One-line description.
    pub fn about(&self) -> &'static str {
        match self {
            Workload::Add => "Add two integers",
            Workload::Sleep => "Sleep for a number of seconds",
            Workload::Spin => "Busy-loop for a number of iterations",
            Workload::Alloc => "Allocate and drop a number of buffers",
            Workload::Write => "Write bytes to a temporary file",
            Workload::Fail => "Fail with a message",
        }
    }
}

/// Parse the positional argument at `index`, or fall back to `default`.
pub fn positional<T>(args: &[String], index: usize, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", raw, name)),
        None => Ok(default),
    }
}

pub fn add() -> impl Callable<(i64, i64), Output = i64, Error = WorkloadError> + Send + Sync {
    function("add", |(a, b): (i64, i64)| a.wrapping_add(b)).with_error::<WorkloadError>()
}

pub fn sleep() -> impl Callable<(f64,), Output = f64, Error = WorkloadError> + Send + Sync {
    try_function("sleep", |(seconds,): (f64,)| -> Result<f64, WorkloadError> {
        let duration = Duration::try_from_secs_f64(seconds)
            .map_err(|e| WorkloadError::InvalidArgument(format!("seconds: {}", e)))?;
        std::thread::sleep(duration);
        Ok(seconds)
    })
}

pub fn spin() -> impl Callable<(u64,), Output = u64, Error = WorkloadError> + Send + Sync {
    function("spin", |(iterations,): (u64,)| {
        let mut acc = 0u64;
        for i in 0..iterations {
            acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
        acc
    })
    .with_error::<WorkloadError>()
}

pub fn alloc() -> impl Callable<(usize, usize), Output = usize, Error = WorkloadError> + Send + Sync
{
    function("alloc", |(count, size): (usize, usize)| {
        let buffers: Vec<Vec<u8>> = (0..count).map(|_| black_box(vec![0u8; size])).collect();
        buffers.iter().map(Vec::len).sum::<usize>()
    })
    .with_error::<WorkloadError>()
}

pub fn write() -> impl Callable<(u64,), Output = u64, Error = WorkloadError> + Send + Sync {
    try_function("write", |(bytes,): (u64,)| -> Result<u64, WorkloadError> {
        let path = scratch_path();
        let result = write_scratch(&path, bytes);
        // Remove even on failure; the file may not exist.
        let _ = fs::remove_file(&path);
        result
    })
}

pub fn fail() -> impl Callable<(String,), Output = (), Error = WorkloadError> + Send + Sync {
    try_function("fail", |(message,): (String,)| -> Result<(), WorkloadError> {
        Err(WorkloadError::Failed(message))
    })
}

fn scratch_path() -> PathBuf {
    std::env::temp_dir().join(format!("debugkit-write-{}.bin", std::process::id()))
}

fn write_scratch(path: &Path, bytes: u64) -> Result<u64, WorkloadError> {
    const CHUNK: usize = 64 * 1024;

    let mut file = File::create(path)?;
    let chunk = vec![0xA5u8; CHUNK];
    let mut remaining = bytes;
    while remaining > 0 {
        let n = remaining.min(CHUNK as u64) as usize;
        file.write_all(&chunk[..n])?;
        remaining -= n as u64;
    }
    file.sync_all()?;
    Ok(bytes)
}
