//! The resource-sampling contract and a scripted implementation.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use debugkit_core::{SampleError, SampleResult};

/// Process memory counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Resident set size in bytes.
    pub rss: u64,
    /// Virtual memory size in bytes.
    pub vms: u64,
}

/// Cumulative disk I/O counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskCounters {
    /// Bytes read.
    pub read_bytes: u64,
    /// Bytes written.
    pub write_bytes: u64,
}

/// Cumulative network I/O counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCounters {
    /// Bytes sent.
    pub sent_bytes: u64,
    /// Bytes received.
    pub recv_bytes: u64,
}

/// Point-in-time access to process resource counters.
///
/// Implementations are shared between wrappers and threads. Each query is
/// independent and must not block on I/O beyond reading a counter source.
pub trait ResourceSampler: Send + Sync {
    /// CPU utilisation since the previous call, in percent.
    ///
    /// The first call establishes a baseline and may return `0.0`.
    fn cpu_percent(&self) -> SampleResult<f64>;

    /// Current memory counters.
    fn memory_info(&self) -> SampleResult<MemoryInfo>;

    /// Current cumulative disk counters.
    fn disk_counters(&self) -> SampleResult<DiskCounters>;

    /// Current cumulative network counters.
    fn network_counters(&self) -> SampleResult<NetworkCounters>;
}

impl<T: ResourceSampler + ?Sized> ResourceSampler for &T {
    fn cpu_percent(&self) -> SampleResult<f64> {
        (**self).cpu_percent()
    }

    fn memory_info(&self) -> SampleResult<MemoryInfo> {
        (**self).memory_info()
    }

    fn disk_counters(&self) -> SampleResult<DiskCounters> {
        (**self).disk_counters()
    }

    fn network_counters(&self) -> SampleResult<NetworkCounters> {
        (**self).network_counters()
    }
}

/// One full set of readings fed to a [`ScriptedSampler`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    /// CPU percent.
    pub cpu_percent: f64,
    /// Memory counters.
    pub memory: MemoryInfo,
    /// Disk counters.
    pub disk: DiskCounters,
    /// Network counters.
    pub network: NetworkCounters,
}

struct Script<T> {
    queue: VecDeque<T>,
    last: T,
}

impl<T: Copy + Default> Script<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            last: T::default(),
        }
    }

    fn next(&mut self) -> T {
        if let Some(value) = self.queue.pop_front() {
            self.last = value;
        }
        self.last
    }
}

/// A sampler that replays pre-programmed readings.
///
/// Each counter has its own queue; once a queue runs dry the last value
/// repeats. An unavailable sampler fails every query.
pub struct ScriptedSampler {
    cpu: Mutex<Script<f64>>,
    memory: Mutex<Script<MemoryInfo>>,
    disk: Mutex<Script<DiskCounters>>,
    network: Mutex<Script<NetworkCounters>>,
    available: bool,
}

impl ScriptedSampler {
    /// Create a sampler that reports zeros until readings are pushed.
    pub fn new() -> Self {
        Self {
            cpu: Mutex::new(Script::new()),
            memory: Mutex::new(Script::new()),
            disk: Mutex::new(Script::new()),
            network: Mutex::new(Script::new()),
            available: true,
        }
    }

    /// Create a sampler whose every query fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Queue a full reading.
    pub fn with_reading(self, reading: Reading) -> Self {
        self.push(reading);
        self
    }

    /// Queue a full reading.
    pub fn push(&self, reading: Reading) {
        self.cpu.lock().queue.push_back(reading.cpu_percent);
        self.memory.lock().queue.push_back(reading.memory);
        self.disk.lock().queue.push_back(reading.disk);
        self.network.lock().queue.push_back(reading.network);
    }

    fn check(&self, counter: &'static str) -> SampleResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(SampleError::Unsupported(counter))
        }
    }
}

impl Default for ScriptedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for ScriptedSampler {
    fn cpu_percent(&self) -> SampleResult<f64> {
        self.check("cpu percent")?;
        Ok(self.cpu.lock().next())
    }

    fn memory_info(&self) -> SampleResult<MemoryInfo> {
        self.check("memory counters")?;
        Ok(self.memory.lock().next())
    }

    fn disk_counters(&self) -> SampleResult<DiskCounters> {
        self.check("disk counters")?;
        Ok(self.disk.lock().next())
    }

    fn network_counters(&self) -> SampleResult<NetworkCounters> {
        self.check("network counters")?;
        Ok(self.network.lock().next())
    }
}

impl std::fmt::Debug for ScriptedSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSampler")
            .field("pending", &self.cpu.lock().queue.len())
            .field("available", &self.available)
            .finish()
    }
}
