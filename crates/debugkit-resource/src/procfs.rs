//! Resource sampling backed by the operating system.
//!
//! CPU time comes from `getrusage` on every Unix. Memory, disk and network
//! counters are read from procfs and are only available on Linux; other
//! targets report [`SampleError::Unsupported`].
//!
//! Memory and CPU counters are per-process. Disk and network counters are
//! system-wide totals, so they include activity from other processes.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use debugkit_core::{SampleError, SampleResult};

use crate::sampler::{DiskCounters, MemoryInfo, NetworkCounters, ResourceSampler};

/// Bytes per sector in `/proc/diskstats`, independent of the device.
const SECTOR_SIZE: u64 = 512;

const DEFAULT_PAGE_SIZE: u64 = 4096;

#[derive(Debug, Clone, Copy)]
struct CpuBaseline {
    at: Instant,
    cpu_time: Duration,
}

/// Samples the current process through the operating system.
pub struct ProcSampler {
    proc_root: PathBuf,
    sys_block: PathBuf,
    page_size: u64,
    cpu_baseline: Mutex<Option<CpuBaseline>>,
}

impl ProcSampler {
    /// Create a sampler for the current process.
    pub fn new() -> Self {
        Self::with_roots("/proc", "/sys/block")
    }

    /// Create a sampler reading procfs and sysfs from custom locations.
    pub fn with_roots(proc_root: impl Into<PathBuf>, sys_block: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_block: sys_block.into(),
            page_size: page_size(),
            cpu_baseline: Mutex::new(None),
        }
    }

    fn read(&self, relative: &str) -> SampleResult<(PathBuf, String)> {
        let path = self.proc_root.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok((path, text)),
            Err(source) => Err(SampleError::Io { path, source }),
        }
    }

    fn is_whole_disk(&self, name: &str) -> bool {
        if !self.sys_block.is_dir() {
            return true;
        }
        self.sys_block.join(name.replace('/', "!")).exists()
    }
}

impl Default for ProcSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for ProcSampler {
    fn cpu_percent(&self) -> SampleResult<f64> {
        let now = Instant::now();
        let cpu_time = process_cpu_time()?;

        let previous = self.cpu_baseline.lock().replace(CpuBaseline { at: now, cpu_time });
        let percent = match previous {
            None => 0.0,
            Some(baseline) => {
                let wall = now.saturating_duration_since(baseline.at);
                if wall.is_zero() {
                    0.0
                } else {
                    let busy = cpu_time.saturating_sub(baseline.cpu_time);
                    busy.as_secs_f64() / wall.as_secs_f64() * 100.0
                }
            }
        };

        let percent = (percent * 10.0).round() / 10.0;
        trace!(percent, "Sampled CPU percent");
        Ok(percent)
    }

    fn memory_info(&self) -> SampleResult<MemoryInfo> {
        if !cfg!(target_os = "linux") {
            return Err(SampleError::Unsupported("memory counters"));
        }
        let (path, text) = self.read("self/statm")?;
        parse_statm(&text, self.page_size).ok_or_else(|| SampleError::Parse {
            path,
            detail: "expected size and resident page counts".to_string(),
        })
    }

    fn disk_counters(&self) -> SampleResult<DiskCounters> {
        if !cfg!(target_os = "linux") {
            return Err(SampleError::Unsupported("disk counters"));
        }
        let (path, text) = self.read("diskstats")?;
        parse_diskstats(&text, |name| self.is_whole_disk(name)).ok_or_else(|| {
            SampleError::Parse {
                path,
                detail: "expected sector counts for each device".to_string(),
            }
        })
    }

    fn network_counters(&self) -> SampleResult<NetworkCounters> {
        if !cfg!(target_os = "linux") {
            return Err(SampleError::Unsupported("network counters"));
        }
        let (path, text) = self.read("net/dev")?;
        parse_net_dev(&text).ok_or_else(|| SampleError::Parse {
            path,
            detail: "expected byte counters for each interface".to_string(),
        })
    }
}

impl std::fmt::Debug for ProcSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcSampler")
            .field("proc_root", &self.proc_root)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(unix)]
fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as u64 } else { DEFAULT_PAGE_SIZE }
}

#[cfg(not(unix))]
fn page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(unix)]
fn process_cpu_time() -> SampleResult<Duration> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage fills the struct when it returns 0.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return Err(SampleError::Os {
            call: "getrusage",
            source: std::io::Error::last_os_error(),
        });
    }
    // SAFETY: checked rc above.
    let usage = unsafe { usage.assume_init() };
    Ok(timeval_duration(usage.ru_utime) + timeval_duration(usage.ru_stime))
}

#[cfg(unix)]
fn timeval_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

#[cfg(not(unix))]
fn process_cpu_time() -> SampleResult<Duration> {
    Err(SampleError::Unsupported("cpu time"))
}

/// Parse `/proc/<pid>/statm` into byte counts.
pub fn parse_statm(text: &str, page_size: u64) -> Option<MemoryInfo> {
    let mut fields = text.split_whitespace();
    let size: u64 = fields.next()?.parse().ok()?;
    let resident: u64 = fields.next()?.parse().ok()?;
    Some(MemoryInfo {
        rss: resident.saturating_mul(page_size),
        vms: size.saturating_mul(page_size),
    })
}

/// Sum `/proc/diskstats` sector counters over the devices `include` accepts.
pub fn parse_diskstats(text: &str, include: impl Fn(&str) -> bool) -> Option<DiskCounters> {
    let mut counters = DiskCounters::default();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            return None;
        }
        if !include(fields[2]) {
            continue;
        }
        let sectors_read: u64 = fields[5].parse().ok()?;
        let sectors_written: u64 = fields[9].parse().ok()?;
        counters.read_bytes = counters
            .read_bytes
            .saturating_add(sectors_read.saturating_mul(SECTOR_SIZE));
        counters.write_bytes = counters
            .write_bytes
            .saturating_add(sectors_written.saturating_mul(SECTOR_SIZE));
    }
    Some(counters)
}

/// Sum `/proc/net/dev` byte counters over every interface.
pub fn parse_net_dev(text: &str) -> Option<NetworkCounters> {
    let mut counters = NetworkCounters::default();
    // The two header lines carry no ':' separator.
    for line in text.lines() {
        let Some((_, stats)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<&str> = stats.split_whitespace().collect();
        if fields.len() < 9 {
            return None;
        }
        let received: u64 = fields[0].parse().ok()?;
        let sent: u64 = fields[8].parse().ok()?;
        counters.recv_bytes = counters.recv_bytes.saturating_add(received);
        counters.sent_bytes = counters.sent_bytes.saturating_add(sent);
    }
    Some(counters)
}

/// Check whether procfs is mounted at `root`.
pub fn procfs_available(root: &Path) -> bool {
    root.join("self").exists()
}
