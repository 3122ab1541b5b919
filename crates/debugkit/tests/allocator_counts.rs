//! GC observation against the real allocator counter.
//!
//! Kept to a single test so no other test thread allocates while it runs.

use std::hint::black_box;
use std::sync::Arc;

use debugkit::prelude::*;

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator::system();

#[test]
fn test_counting_allocator_reports_only_allocating_calls() {
    let reporter = Arc::new(CollectingReporter::new());
    let toolkit = Toolkit::builder()
        .with_reporter(reporter.clone())
        .with_gc_counter(Arc::new(&ALLOCATOR))
        .build()
        .unwrap();

    let noop = toolkit.observe_gc(function("noop", |(): ()| ()));
    for _ in 0..5 {
        noop.call(()).unwrap();
    }
    assert!(reporter.is_empty(), "unexpected reports: {:?}", reporter.messages());

    let allocate = toolkit.observe_gc(function("allocate", |(size,): (usize,)| {
        black_box(vec![0u8; size]).len()
    }));
    assert_eq!(allocate.call((4096,)).unwrap(), 4096);

    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Garbage collection counts changed for allocate: Before: ("));
}
