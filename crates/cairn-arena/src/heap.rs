//! Heap-backed arena (dynamic mode).
//!
//! [`HeapArena`] acquires its backing region once at construction from a
//! [`StorageProvider`] and never resizes it. Allocation is a cursor bump;
//! `reset` rewinds the cursor; `destroy` (or drop) hands the region back to
//! the provider. The provider and the lock hooks are injectable, with
//! platform-allocator and no-op defaults.

use std::fmt;
use std::sync::Arc;

use cairn_core::traits::{HeapStorage, LockHooks, NoopHooks, StorageProvider};
use cairn_core::{Allocation, ArenaAlloc, ArenaError};

use crate::bump;
use crate::lock::HookGuard;
use crate::report;

/// Fixed-capacity bump arena over provider-acquired storage.
///
/// All allocation state lives in the instance: the backing region, the
/// cursor, and the advisory `last_error` slot. Allocations return
/// [`Allocation`] handles resolved through [`HeapArena::bytes`] /
/// [`HeapArena::bytes_mut`]; handed-out ranges are never reissued until a
/// [`HeapArena::reset`].
///
/// Returned bytes are not cleared on allocation — the region is zeroed when
/// the default provider first acquires it, but after a reset an allocation
/// sees whatever the previous cycle wrote there.
pub struct HeapArena {
    /// Backing region. `None` only after `destroy` has taken it.
    storage: Option<Box<[u8]>>,
    /// Bump cursor: next free byte offset.
    offset: usize,
    /// Most recent allocation failure; cleared by any success.
    last_error: Option<ArenaError>,
    /// Source of the backing region, called again on destroy/drop.
    provider: Box<dyn StorageProvider>,
    /// Critical-section hooks wrapped around every mutating operation.
    hooks: Arc<dyn LockHooks>,
}

impl HeapArena {
    /// Create an arena of `size` bytes using the platform allocator and
    /// no-op lock hooks.
    ///
    /// Fails with [`ArenaError::InvalidSize`] for a zero size and
    /// [`ArenaError::StorageExhausted`] if the allocator cannot supply the
    /// region; both failures are also recorded in the process-wide slot
    /// (see [`crate::construction_error`]) since no instance exists to
    /// hold them.
    pub fn new(size: usize) -> Result<Self, ArenaError> {
        Self::with_parts(size, Box::new(HeapStorage), Arc::new(NoopHooks))
    }

    /// Create an arena with a custom storage provider.
    pub fn with_provider(
        size: usize,
        provider: Box<dyn StorageProvider>,
    ) -> Result<Self, ArenaError> {
        Self::with_parts(size, provider, Arc::new(NoopHooks))
    }

    /// Create an arena with a custom provider and lock hooks.
    ///
    /// Construction itself runs inside the hook critical section: the
    /// provider call is part of the checked-then-committed sequence.
    pub fn with_parts(
        size: usize,
        provider: Box<dyn StorageProvider>,
        hooks: Arc<dyn LockHooks>,
    ) -> Result<Self, ArenaError> {
        let _cs = HookGuard::enter(&hooks);

        if size == 0 {
            report::record(ArenaError::InvalidSize);
            return Err(ArenaError::InvalidSize);
        }

        let Some(region) = provider.acquire(size) else {
            let err = ArenaError::StorageExhausted { requested: size };
            report::record(err.clone());
            return Err(err);
        };

        Ok(Self {
            storage: Some(region),
            offset: 0,
            last_error: None,
            provider,
            hooks,
        })
    }

    /// Carve `size` bytes off the arena with no alignment guarantee.
    ///
    /// On success the cursor advances by exactly `size` and `last_error`
    /// clears. On failure the cursor is unchanged and the error is both
    /// returned and recorded.
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        let _cs = HookGuard::enter(&self.hooks);
        match bump::carve(self.offset, self.capacity(), size) {
            Ok(carve) => {
                self.offset = carve.end;
                self.last_error = None;
                Ok(Allocation::new(carve.start, size))
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Carve `size` bytes starting at the next address that is a multiple
    /// of `alignment` (a nonzero power of two).
    ///
    /// Alignment is computed from the real base address of the backing
    /// region, so the guarantee holds whatever the region's own alignment.
    /// On failure the cursor is unchanged — padding that would have been
    /// skipped is never committed.
    pub fn alloc_aligned(
        &mut self,
        size: usize,
        alignment: usize,
    ) -> Result<Allocation, ArenaError> {
        let _cs = HookGuard::enter(&self.hooks);
        match bump::carve_aligned(self.base(), self.offset, self.capacity(), size, alignment) {
            Ok(carve) => {
                self.offset = carve.end;
                self.last_error = None;
                Ok(Allocation::new(carve.start, size))
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Rewind the cursor to zero, reclaiming all allocations at once.
    ///
    /// Storage contents are untouched — callers must not assume previously
    /// allocated ranges are cleared. Idempotent.
    pub fn reset(&mut self) {
        let _cs = HookGuard::enter(&self.hooks);
        self.offset = 0;
        self.last_error = None;
    }

    /// Destroy the arena, returning the backing region to its provider.
    ///
    /// Also clears the process-wide construction-error slot. Dropping the
    /// arena without calling this releases the region the same way; the
    /// explicit form exists for callers that want the release to be
    /// visible in the control flow. After either, the arena is gone by
    /// move semantics — reuse is a compile error.
    pub fn destroy(mut self) {
        let _cs = HookGuard::enter(&self.hooks);
        if let Some(region) = self.storage.take() {
            self.provider.release(region);
        }
        report::clear();
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Total capacity in bytes, fixed for the arena's lifetime.
    pub fn capacity(&self) -> usize {
        self.storage.as_deref().map_or(0, <[u8]>::len)
    }

    /// Bytes still free.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset
    }

    /// The most recent operation's failure, or `None` after any success.
    pub fn last_error(&self) -> Option<&ArenaError> {
        self.last_error.as_ref()
    }

    /// Resolve an allocation to a shared byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `allocation` does not lie within this arena's region
    /// (a forged handle, or one issued by a different arena).
    pub fn bytes(&self, allocation: Allocation) -> &[u8] {
        let region = self.storage.as_deref().unwrap_or(&[]);
        &region[allocation.offset()..allocation.end()]
    }

    /// Resolve an allocation to a mutable byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `allocation` does not lie within this arena's region.
    pub fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        let region = self.storage.as_deref_mut().unwrap_or(&mut []);
        &mut region[allocation.offset()..allocation.end()]
    }

    /// Integer value of the backing region's base address.
    fn base(&self) -> usize {
        self.storage
            .as_deref()
            .map_or(0, |region| region.as_ptr() as usize)
    }
}

impl fmt::Debug for HeapArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapArena")
            .field("capacity", &self.capacity())
            .field("used", &self.offset)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl Drop for HeapArena {
    fn drop(&mut self) {
        if let Some(region) = self.storage.take() {
            let _cs = HookGuard::enter(&self.hooks);
            self.provider.release(region);
        }
    }
}

impl ArenaAlloc for HeapArena {
    fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        HeapArena::alloc(self, size)
    }

    fn alloc_aligned(&mut self, size: usize, alignment: usize) -> Result<Allocation, ArenaError> {
        HeapArena::alloc_aligned(self, size, alignment)
    }

    fn reset(&mut self) {
        HeapArena::reset(self)
    }

    fn used(&self) -> usize {
        HeapArena::used(self)
    }

    fn capacity(&self) -> usize {
        HeapArena::capacity(self)
    }

    fn last_error(&self) -> Option<&ArenaError> {
        HeapArena::last_error(self)
    }

    fn bytes(&self, allocation: Allocation) -> &[u8] {
        HeapArena::bytes(self, allocation)
    }

    fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        HeapArena::bytes_mut(self, allocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_serial;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        released: AtomicUsize,
    }

    /// Provider that counts acquire/release pairs, delegating to the heap.
    struct CountingStorage(Arc<Counters>);

    impl StorageProvider for CountingStorage {
        fn acquire(&self, size: usize) -> Option<Box<[u8]>> {
            self.0.acquired.fetch_add(1, Ordering::SeqCst);
            HeapStorage.acquire(size)
        }

        fn release(&self, region: Box<[u8]>) {
            self.0.released.fetch_add(1, Ordering::SeqCst);
            drop(region);
        }
    }

    /// Provider that is always out of memory.
    struct ExhaustedStorage;

    impl StorageProvider for ExhaustedStorage {
        fn acquire(&self, _size: usize) -> Option<Box<[u8]>> {
            None
        }

        fn release(&self, _region: Box<[u8]>) {}
    }

    /// Hooks that count entries and exits and reject reentry.
    #[derive(Default)]
    struct CountingHooks {
        acquires: AtomicUsize,
        releases: AtomicUsize,
    }

    impl LockHooks for CountingHooks {
        fn acquire(&self) {
            let depth = self.acquires.fetch_add(1, Ordering::SeqCst)
                - self.releases.load(Ordering::SeqCst);
            assert_eq!(depth, 0, "critical section reentered");
        }

        fn release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn sequential_alloc() {
        let mut arena = HeapArena::new(1024).unwrap();
        let a = arena.alloc(100).unwrap();
        let b = arena.alloc(200).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 100);
        assert_eq!(arena.used(), 300);
        assert_eq!(arena.remaining(), 724);
    }

    #[test]
    fn alloc_fails_when_full() {
        let mut arena = HeapArena::new(100).unwrap();
        assert!(arena.alloc(100).is_ok());
        assert!(arena.alloc(1).is_err());
    }

    #[test]
    fn overflow_then_reset_scenario() {
        // Capacity 100: a 60-byte allocation succeeds at offset 0, a
        // 50-byte follow-up overflows leaving the cursor at 60, and after
        // a reset the 50-byte allocation lands at offset 0.
        let mut arena = HeapArena::new(100).unwrap();

        let a = arena.alloc(60).unwrap();
        assert_eq!((a.offset(), a.end()), (0, 60));

        let err = arena.alloc(50).unwrap_err();
        assert_eq!(
            err,
            ArenaError::CapacityExceeded {
                requested: 50,
                remaining: 40,
                capacity: 100,
            }
        );
        assert_eq!(arena.used(), 60);
        assert_eq!(arena.last_error(), Some(&err));

        arena.reset();
        let b = arena.alloc(50).unwrap();
        assert_eq!(b.offset(), 0);
        assert_eq!(arena.last_error(), None);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut arena = HeapArena::new(64).unwrap();
        arena.alloc(32).unwrap();
        arena.reset();
        arena.reset();
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn reset_round_trip_returns_first_address() {
        let mut arena = HeapArena::new(128).unwrap();
        let first = arena.alloc(16).unwrap();
        let first_addr = arena.bytes(first).as_ptr();

        arena.reset();
        let again = arena.alloc(16).unwrap();
        assert_eq!(arena.bytes(again).as_ptr(), first_addr);
    }

    #[test]
    fn zero_size_rejected_and_recorded() {
        let mut arena = HeapArena::new(64).unwrap();
        assert_eq!(arena.alloc(0), Err(ArenaError::InvalidSize));
        assert_eq!(arena.last_error(), Some(&ArenaError::InvalidSize));
        assert_eq!(arena.used(), 0);

        // A success clears the advisory slot.
        arena.alloc(8).unwrap();
        assert_eq!(arena.last_error(), None);
    }

    #[test]
    fn bytes_reads_written_data() {
        let mut arena = HeapArena::new(64).unwrap();
        let a = arena.alloc(5).unwrap();
        {
            let data = arena.bytes_mut(a);
            data[0] = 1;
            data[4] = 5;
        }
        let read = arena.bytes(a);
        assert_eq!(read[0], 1);
        assert_eq!(read[4], 5);
    }

    #[test]
    fn fresh_storage_is_zeroed() {
        let mut arena = HeapArena::new(32).unwrap();
        let a = arena.alloc(32).unwrap();
        assert!(arena.bytes(a).iter().all(|&b| b == 0));
    }

    #[test]
    fn aligned_alloc_returns_aligned_address() {
        let mut arena = HeapArena::new(256).unwrap();
        arena.alloc(1).unwrap();

        for &alignment in &[1usize, 2, 8, 32] {
            let a = arena.alloc_aligned(4, alignment).unwrap();
            assert_eq!(arena.bytes(a).as_ptr() as usize % alignment, 0);
        }
    }

    #[test]
    fn aligned_alloc_skip_matches_base_address() {
        // With one byte allocated, an 8-aligned request must skip exactly
        // to the next 8-multiple of (base + 1).
        let mut arena = HeapArena::new(64).unwrap();
        arena.alloc(1).unwrap();

        let base = arena.bytes(Allocation::new(0, 1)).as_ptr() as usize;
        let expected_skip = (8 - ((base + 1) % 8)) % 8;

        let a = arena.alloc_aligned(4, 8).unwrap();
        assert_eq!(a.offset(), 1 + expected_skip);
        assert_eq!(arena.used(), 1 + expected_skip + 4);
    }

    #[test]
    fn aligned_overflow_leaves_cursor_unchanged() {
        let mut arena = HeapArena::new(16).unwrap();
        arena.alloc(1).unwrap();

        let err = arena.alloc_aligned(16, 8).unwrap_err();
        assert!(matches!(err, ArenaError::AlignedCapacityExceeded { .. }));
        assert_eq!(arena.used(), 1);
    }

    #[test]
    fn non_power_of_two_alignment_rejected() {
        let mut arena = HeapArena::new(64).unwrap();
        assert_eq!(
            arena.alloc_aligned(4, 3),
            Err(ArenaError::InvalidAlignment { alignment: 3 })
        );
    }

    #[test]
    fn zero_capacity_rejected() {
        let _serial = test_serial::GLOBAL_STATE
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        assert_eq!(HeapArena::new(0).unwrap_err(), ArenaError::InvalidSize);
        assert_eq!(crate::construction_error(), Some(ArenaError::InvalidSize));
    }

    #[test]
    fn exhausted_provider_reported_globally() {
        let _serial = test_serial::GLOBAL_STATE
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let err = HeapArena::with_provider(512, Box::new(ExhaustedStorage)).unwrap_err();
        assert_eq!(err, ArenaError::StorageExhausted { requested: 512 });
        assert_eq!(crate::construction_error(), Some(err));
    }

    #[test]
    fn destroy_returns_region_and_clears_slot() {
        let _serial = test_serial::GLOBAL_STATE
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let counters = Arc::new(Counters::default());
        let arena =
            HeapArena::with_provider(128, Box::new(CountingStorage(Arc::clone(&counters))))
                .unwrap();
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 0);

        arena.destroy();
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
        assert_eq!(crate::construction_error(), None);
    }

    #[test]
    fn drop_also_releases_region() {
        let counters = Arc::new(Counters::default());
        {
            let _arena =
                HeapArena::with_provider(128, Box::new(CountingStorage(Arc::clone(&counters))))
                    .unwrap();
        }
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hooks_balance_across_all_operations() {
        // destroy() clears the process-wide slot, so serialise with the
        // tests that assert its contents.
        let _serial = test_serial::GLOBAL_STATE
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let hooks = Arc::new(CountingHooks::default());
        let mut arena = HeapArena::with_parts(
            64,
            Box::new(HeapStorage),
            Arc::clone(&hooks) as Arc<dyn LockHooks>,
        )
        .unwrap();

        arena.alloc(8).unwrap();
        let _ = arena.alloc(128); // fails
        arena.alloc_aligned(8, 8).unwrap();
        let _ = arena.alloc_aligned(8, 3); // fails
        arena.reset();
        arena.destroy();

        let acquires = hooks.acquires.load(Ordering::SeqCst);
        let releases = hooks.releases.load(Ordering::SeqCst);
        // new + 4 allocs + reset + destroy.
        assert_eq!(acquires, 7);
        assert_eq!(acquires, releases);
    }

    #[test]
    fn works_through_the_shared_trait() {
        fn fill<A: ArenaAlloc>(arena: &mut A) -> usize {
            let mut count = 0;
            while arena.alloc(16).is_ok() {
                count += 1;
            }
            count
        }

        let mut arena = HeapArena::new(64).unwrap();
        assert_eq!(fill(&mut arena), 4);
        assert_eq!(arena.remaining(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn successful_allocations_are_disjoint_and_in_bounds(
                sizes in proptest::collection::vec(1usize..64, 1..32),
            ) {
                let mut arena = HeapArena::new(512).unwrap();
                let mut ranges = Vec::new();
                for size in sizes {
                    if let Ok(a) = arena.alloc(size) {
                        ranges.push((a.offset(), a.end()));
                    }
                }
                for &(_, end) in &ranges {
                    prop_assert!(end <= arena.capacity());
                }
                for (i, &(a_start, a_end)) in ranges.iter().enumerate() {
                    for &(b_start, b_end) in &ranges[i + 1..] {
                        prop_assert!(a_end <= b_start || b_end <= a_start);
                    }
                }
            }

            #[test]
            fn failed_allocations_leave_cursor_unchanged(
                sizes in proptest::collection::vec(1usize..256, 1..32),
            ) {
                let mut arena = HeapArena::new(256).unwrap();
                for size in sizes {
                    let before = arena.used();
                    match arena.alloc(size) {
                        Ok(_) => prop_assert_eq!(arena.used(), before + size),
                        Err(_) => prop_assert_eq!(arena.used(), before),
                    }
                }
            }

            #[test]
            fn aligned_addresses_are_multiples_of_alignment(
                ops in proptest::collection::vec((1usize..32, 0u32..6), 1..16),
            ) {
                let mut arena = HeapArena::new(1024).unwrap();
                for (size, exp) in ops {
                    let alignment = 1usize << exp;
                    if let Ok(a) = arena.alloc_aligned(size, alignment) {
                        prop_assert_eq!(
                            arena.bytes(a).as_ptr() as usize % alignment,
                            0
                        );
                    }
                }
            }
        }
    }
}
