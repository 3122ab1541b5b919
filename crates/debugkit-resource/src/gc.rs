//! Collector activity counters.
//!
//! Rust has no tracing garbage collector, so the counter vector observed
//! around a call is allocator activity: one tier each for allocations,
//! deallocations and reallocations. [`CountingAllocator`] produces those
//! counts when installed as the global allocator.
//!
//! ```ignore
//! use debugkit_resource::gc::CountingAllocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: CountingAllocator = CountingAllocator::system();
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};

use debugkit_core::SampleResult;

/// Most tiers a [`GcCounts`] can hold.
pub const MAX_TIERS: usize = 8;

/// An opaque vector of per-tier collector counts.
///
/// Only equality and the textual rendering `(a, b, c)` are meaningful.
/// The tiers are stored inline, so reading counts never allocates and never
/// disturbs an allocator it is observing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GcCounts {
    tiers: [u64; MAX_TIERS],
    len: usize,
}

impl GcCounts {
    /// Create a counter vector. Tiers past [`MAX_TIERS`] are dropped.
    pub fn new(tiers: &[u64]) -> Self {
        let len = tiers.len().min(MAX_TIERS);
        let mut counts = Self {
            tiers: [0; MAX_TIERS],
            len,
        };
        counts.tiers[..len].copy_from_slice(&tiers[..len]);
        counts
    }

    /// The per-tier counts.
    pub fn tiers(&self) -> &[u64] {
        &self.tiers[..self.len]
    }
}

impl<const N: usize> From<[u64; N]> for GcCounts {
    fn from(tiers: [u64; N]) -> Self {
        Self::new(&tiers)
    }
}

impl Serialize for GcCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tiers())
    }
}

impl fmt::Display for GcCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, count) in self.tiers().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", count)?;
        }
        f.write_str(")")
    }
}

/// Source of the collector counter vector.
pub trait GcCounter: Send + Sync {
    /// Read the current counts.
    fn counts(&self) -> SampleResult<GcCounts>;
}

impl<T: GcCounter + ?Sized> GcCounter for &T {
    fn counts(&self) -> SampleResult<GcCounts> {
        (**self).counts()
    }
}

/// A global allocator wrapper that counts allocator activity.
pub struct CountingAllocator<A = System> {
    inner: A,
    allocations: AtomicU64,
    deallocations: AtomicU64,
    reallocations: AtomicU64,
}

impl CountingAllocator<System> {
    /// Count activity of the system allocator.
    pub const fn system() -> Self {
        Self::new(System)
    }
}

impl<A> CountingAllocator<A> {
    /// Count activity of `inner`.
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicU64::new(0),
            deallocations: AtomicU64::new(0),
            reallocations: AtomicU64::new(0),
        }
    }

    /// Number of allocations so far.
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Number of deallocations so far.
    pub fn deallocations(&self) -> u64 {
        self.deallocations.load(Ordering::Relaxed)
    }

    /// Number of reallocations so far.
    pub fn reallocations(&self) -> u64 {
        self.reallocations.load(Ordering::Relaxed)
    }
}

// SAFETY: every method forwards to `inner` with the caller's arguments
// unchanged; counting touches only atomics and never allocates.
unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        unsafe { self.inner.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        unsafe { self.inner.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        self.reallocations.fetch_add(1, Ordering::Relaxed);
        unsafe { self.inner.realloc(ptr, layout, new_size) }
    }
}

impl<A: Send + Sync> GcCounter for CountingAllocator<A> {
    fn counts(&self) -> SampleResult<GcCounts> {
        Ok(GcCounts::from([
            self.allocations(),
            self.deallocations(),
            self.reallocations(),
        ]))
    }
}

impl<A> fmt::Debug for CountingAllocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingAllocator")
            .field("allocations", &self.allocations())
            .field("deallocations", &self.deallocations())
            .field("reallocations", &self.reallocations())
            .finish()
    }
}

/// A counter vector advanced explicitly.
///
/// Holds at most [`MAX_TIERS`] tiers. Counts never move on their own, which makes it the quiet default when no
/// allocator is instrumented and a deterministic source in tests.
#[derive(Debug)]
pub struct ManualGcCounter {
    tiers: Vec<AtomicU64>,
}

impl ManualGcCounter {
    /// Create a counter with `tiers` zeroed tiers.
    pub fn new(tiers: usize) -> Self {
        Self {
            tiers: (0..tiers.min(MAX_TIERS)).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Advance one tier. Returns `false` if the tier does not exist.
    pub fn bump(&self, tier: usize) -> bool {
        match self.tiers.get(tier) {
            Some(count) => {
                count.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

impl Default for ManualGcCounter {
    fn default() -> Self {
        Self::new(3)
    }
}

impl GcCounter for ManualGcCounter {
    fn counts(&self) -> SampleResult<GcCounts> {
        let mut counts = GcCounts {
            tiers: [0; MAX_TIERS],
            len: self.tiers.len(),
        };
        for (slot, tier) in counts.tiers.iter_mut().zip(&self.tiers) {
            *slot = tier.load(Ordering::Relaxed);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_counts_display() {
        assert_eq!(GcCounts::new(&[700, 3, 1]).to_string(), "(700, 3, 1)");
        assert_eq!(GcCounts::default().to_string(), "()");
    }

    #[test]
    fn test_gc_counts_equality_ignores_unused_tiers() {
        assert_eq!(GcCounts::from([1, 2]), GcCounts::new(&[1, 2]));
        assert_ne!(GcCounts::from([1, 2]), GcCounts::from([1, 2, 0]));
        assert_eq!(GcCounts::new(&[1; 12]).tiers().len(), MAX_TIERS);
        assert_eq!(serde_json::to_value(GcCounts::from([3, 4])).unwrap(), serde_json::json!([3, 4]));
    }

    #[test]
    fn test_manual_counter_bump() {
        let counter = ManualGcCounter::default();
        let before = counter.counts().unwrap();

        assert!(counter.bump(1));
        assert!(!counter.bump(9));

        let after = counter.counts().unwrap();
        assert_ne!(before, after);
        assert_eq!(after.tiers(), &[0, 1, 0]);
    }

    #[test]
    fn test_counting_allocator_counts_direct_use() {
        let allocator = CountingAllocator::system();
        let layout = Layout::from_size_align(64, 8).unwrap();

        unsafe {
            let ptr = allocator.alloc(layout);
            assert!(!ptr.is_null());
            let ptr = allocator.realloc(ptr, layout, 128);
            assert!(!ptr.is_null());
            allocator.dealloc(ptr, Layout::from_size_align(128, 8).unwrap());
        }

        assert_eq!(allocator.counts().unwrap().tiers(), &[1, 1, 1]);
    }

    #[test]
    fn test_counter_through_reference() {
        let counter = ManualGcCounter::new(2);
        let by_ref: &dyn GcCounter = &counter;
        counter.bump(0);
        assert_eq!(by_ref.counts().unwrap().tiers(), &[1, 0]);
    }
}
