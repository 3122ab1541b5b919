//! Before/after resource snapshots and their deltas.

use std::time::{Duration, Instant};

use serde::Serialize;

use debugkit_core::SampleResult;

use crate::sampler::{DiskCounters, MemoryInfo, NetworkCounters, ResourceSampler};

/// Which counters a snapshot captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    /// CPU percent and memory only.
    Basic,
    /// Every counter the sampler exposes.
    Full,
}

/// A point-in-time reading of process resource counters.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSnapshot {
    /// CPU percent reported by the sampler.
    pub cpu_percent: f64,
    /// Memory counters.
    pub memory: MemoryInfo,
    /// Disk counters, captured only at [`SnapshotScope::Full`].
    pub disk: Option<DiskCounters>,
    /// Network counters, captured only at [`SnapshotScope::Full`].
    pub network: Option<NetworkCounters>,
    /// When the snapshot was taken.
    pub timestamp: Instant,
}

impl ResourceSnapshot {
    /// Capture a snapshot from `sampler`.
    ///
    /// Fails on the first counter the sampler cannot provide.
    pub fn capture<S>(sampler: &S, scope: SnapshotScope) -> SampleResult<Self>
    where
        S: ResourceSampler + ?Sized,
    {
        let timestamp = Instant::now();
        let cpu_percent = sampler.cpu_percent()?;
        let memory = sampler.memory_info()?;
        let (disk, network) = match scope {
            SnapshotScope::Basic => (None, None),
            SnapshotScope::Full => (
                Some(sampler.disk_counters()?),
                Some(sampler.network_counters()?),
            ),
        };

        Ok(Self {
            cpu_percent,
            memory,
            disk,
            network,
            timestamp,
        })
    }

    /// Signed differences between `before` and this snapshot.
    pub fn delta_since(&self, before: &ResourceSnapshot) -> ResourceDelta {
        let disk_after = self.disk.unwrap_or_default();
        let disk_before = before.disk.unwrap_or_default();
        let net_after = self.network.unwrap_or_default();
        let net_before = before.network.unwrap_or_default();

        ResourceDelta {
            cpu_percent: self.cpu_percent - before.cpu_percent,
            rss_bytes: signed_delta(before.memory.rss, self.memory.rss),
            vms_bytes: signed_delta(before.memory.vms, self.memory.vms),
            disk_read_bytes: signed_delta(disk_before.read_bytes, disk_after.read_bytes),
            disk_write_bytes: signed_delta(disk_before.write_bytes, disk_after.write_bytes),
            net_sent_bytes: signed_delta(net_before.sent_bytes, net_after.sent_bytes),
            net_recv_bytes: signed_delta(net_before.recv_bytes, net_after.recv_bytes),
            elapsed: self.timestamp.saturating_duration_since(before.timestamp),
        }
    }
}

/// Signed difference between two snapshots.
///
/// The CPU delta is a raw percentage difference and may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResourceDelta {
    /// CPU percent difference.
    pub cpu_percent: f64,
    /// Resident set size difference in bytes.
    pub rss_bytes: i64,
    /// Virtual memory size difference in bytes.
    pub vms_bytes: i64,
    /// Disk bytes read in between.
    pub disk_read_bytes: i64,
    /// Disk bytes written in between.
    pub disk_write_bytes: i64,
    /// Network bytes sent in between.
    pub net_sent_bytes: i64,
    /// Network bytes received in between.
    pub net_recv_bytes: i64,
    /// Time between the two snapshots.
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn signed_delta(before: u64, after: u64) -> i64 {
    let diff = i128::from(after) - i128::from(before);
    diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
