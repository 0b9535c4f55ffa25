//! Collaborator traits and the shared arena operation surface.
//!
//! The arena is concurrency-agnostic and allocator-agnostic by design:
//! where its backing bytes come from ([`StorageProvider`]) and how callers
//! serialise concurrent access ([`LockHooks`]) are both injected at
//! construction. The defaults ([`HeapStorage`], [`NoopHooks`]) cover the
//! common single-threaded, platform-allocator case.

use crate::error::ArenaError;
use crate::handle::Allocation;

/// Supplies and reclaims backing storage for heap-backed arenas.
///
/// `acquire(n)` must return a region of at least `n` bytes or `None`;
/// `release` must accept exactly the regions `acquire` returned. The
/// provider is called once at construction and once at destruction — never
/// on the allocation fast path.
pub trait StorageProvider: Send + Sync {
    /// Acquire a region of at least `size` bytes, or `None` on exhaustion.
    fn acquire(&self, size: usize) -> Option<Box<[u8]>>;

    /// Return a region previously handed out by [`StorageProvider::acquire`].
    fn release(&self, region: Box<[u8]>);
}

/// Default provider backed by the platform allocator.
///
/// Acquisition is fallible: exhaustion surfaces as `None` rather than an
/// allocator abort, so arena construction can report `StorageExhausted`.
pub struct HeapStorage;

impl StorageProvider for HeapStorage {
    fn acquire(&self, size: usize) -> Option<Box<[u8]>> {
        let mut region = Vec::new();
        region.try_reserve_exact(size).ok()?;
        region.resize(size, 0);
        Some(region.into_boxed_slice())
    }

    fn release(&self, region: Box<[u8]>) {
        drop(region);
    }
}

/// Mutual-exclusion hooks wrapped around every mutating arena operation.
///
/// When bound to a real primitive, `acquire` is called on entry to each
/// mutating operation and `release` before every return path, success or
/// failure. The primitive must not be reentered by the same caller within
/// one critical section — the arena never nests acquisitions, and hook
/// implementations may assume it does not.
pub trait LockHooks: Send + Sync {
    /// Enter the critical section.
    fn acquire(&self);

    /// Leave the critical section.
    fn release(&self);
}

/// No-op hooks for declared single-threaded use.
///
/// With these bound, concurrent mutation of one arena is a data race the
/// caller must avoid by confinement or external synchronisation.
pub struct NoopHooks;

impl LockHooks for NoopHooks {
    fn acquire(&self) {}

    fn release(&self) {}
}

/// The operation surface common to both arena modes.
///
/// Generic callers that do not care whether their arena is heap-backed or
/// static program against this trait rather than a concrete arena type.
pub trait ArenaAlloc {
    /// Carve `size` bytes off the arena with no alignment guarantee.
    fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError>;

    /// Carve `size` bytes starting at the next `alignment`-aligned address.
    fn alloc_aligned(&mut self, size: usize, alignment: usize) -> Result<Allocation, ArenaError>;

    /// Rewind the cursor to zero, reclaiming all allocations at once.
    fn reset(&mut self);

    /// Bytes currently allocated.
    fn used(&self) -> usize;

    /// Total capacity in bytes, fixed for the arena's lifetime.
    fn capacity(&self) -> usize;

    /// Bytes still free.
    fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// The most recent operation's failure, or `None` after any success.
    fn last_error(&self) -> Option<&ArenaError>;

    /// Resolve an allocation to a shared byte slice.
    fn bytes(&self, allocation: Allocation) -> &[u8];

    /// Resolve an allocation to a mutable byte slice.
    fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8];
}
