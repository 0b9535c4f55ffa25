//! Fixed-storage arena (static singleton mode).
//!
//! [`StaticArena`] bump-allocates out of a single process-wide static byte
//! region of [`STATIC_CAPACITY`] bytes — no dynamic allocation anywhere in
//! its lifecycle, for environments without a heap. At most one live
//! instance exists at a time: construction claims the region via an
//! explicit atomic flag, and [`StaticArena::release`] (or drop) unclaims it
//! so a later claim can succeed. Storage is never freed, only recycled.

use std::fmt;
use std::sync::Arc;

use cairn_core::traits::{LockHooks, NoopHooks};
use cairn_core::{Allocation, ArenaAlloc, ArenaError};

use crate::bump;
use crate::lock::HookGuard;
use crate::raw;
use crate::report;

/// Capacity of the static region in bytes.
///
/// Fixed at build time; sized for the small freestanding workloads this
/// mode targets.
pub const STATIC_CAPACITY: usize = 8 * 1024;

/// Bump arena over the process-wide static region.
///
/// Holds the exclusive claim on the region for its whole lifetime. The
/// allocation surface matches [`crate::HeapArena`]; the differences are the
/// compile-time capacity and the claim/release lifecycle in place of
/// acquire/destroy.
pub struct StaticArena {
    /// The claimed static region. Exclusive while this instance lives.
    storage: &'static mut [u8],
    /// Bump cursor: next free byte offset.
    offset: usize,
    /// Most recent allocation failure; cleared by any success.
    last_error: Option<ArenaError>,
    /// Critical-section hooks wrapped around every mutating operation.
    hooks: Arc<dyn LockHooks>,
}

impl StaticArena {
    /// Claim the static region with no-op lock hooks.
    ///
    /// Fails with [`ArenaError::AlreadyClaimed`] — also recorded in the
    /// process-wide slot (see [`crate::construction_error`]) — while
    /// another instance is live. On success the cursor starts at zero.
    pub fn claim() -> Result<Self, ArenaError> {
        Self::claim_with_hooks(Arc::new(NoopHooks))
    }

    /// Claim the static region with custom lock hooks.
    ///
    /// The claim itself is atomic; the hooks additionally serialise it
    /// against other mutating operations sharing the same primitive.
    pub fn claim_with_hooks(hooks: Arc<dyn LockHooks>) -> Result<Self, ArenaError> {
        let _cs = HookGuard::enter(&hooks);
        match raw::try_claim() {
            Some(storage) => Ok(Self {
                storage,
                offset: 0,
                last_error: None,
                hooks: Arc::clone(&hooks),
            }),
            None => {
                report::record(ArenaError::AlreadyClaimed);
                Err(ArenaError::AlreadyClaimed)
            }
        }
    }

    /// Carve `size` bytes off the arena with no alignment guarantee.
    ///
    /// Same contract as [`crate::HeapArena::alloc`].
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        let _cs = HookGuard::enter(&self.hooks);
        match bump::carve(self.offset, self.storage.len(), size) {
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

    /// Carve `size` bytes starting at the next `alignment`-aligned address.
    ///
    /// Same contract as [`crate::HeapArena::alloc_aligned`]; alignment is
    /// computed from the static region's real base address.
    pub fn alloc_aligned(
        &mut self,
        size: usize,
        alignment: usize,
    ) -> Result<Allocation, ArenaError> {
        let _cs = HookGuard::enter(&self.hooks);
        let base = self.storage.as_ptr() as usize;
        match bump::carve_aligned(base, self.offset, self.storage.len(), size, alignment) {
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
    /// Storage contents are untouched. Idempotent.
    pub fn reset(&mut self) {
        let _cs = HookGuard::enter(&self.hooks);
        self.offset = 0;
        self.last_error = None;
    }

    /// Release the claim, making the region available to a future
    /// [`StaticArena::claim`].
    ///
    /// Storage is not freed — it was never separately allocated. Dropping
    /// the instance has the same effect; the explicit form exists for
    /// callers that want the hand-back visible in the control flow.
    pub fn release(self) {
        drop(self);
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Total capacity in bytes (always [`STATIC_CAPACITY`]).
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes still free.
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.offset
    }

    /// The most recent operation's failure, or `None` after any success.
    pub fn last_error(&self) -> Option<&ArenaError> {
        self.last_error.as_ref()
    }

    /// Resolve an allocation to a shared byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `allocation` does not lie within the static region.
    pub fn bytes(&self, allocation: Allocation) -> &[u8] {
        &self.storage[allocation.offset()..allocation.end()]
    }

    /// Resolve an allocation to a mutable byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `allocation` does not lie within the static region.
    pub fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        &mut self.storage[allocation.offset()..allocation.end()]
    }
}

impl fmt::Debug for StaticArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticArena")
            .field("capacity", &self.storage.len())
            .field("used", &self.offset)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl Drop for StaticArena {
    fn drop(&mut self) {
        let _cs = HookGuard::enter(&self.hooks);
        raw::unclaim();
    }
}

impl ArenaAlloc for StaticArena {
    fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        StaticArena::alloc(self, size)
    }

    fn alloc_aligned(&mut self, size: usize, alignment: usize) -> Result<Allocation, ArenaError> {
        StaticArena::alloc_aligned(self, size, alignment)
    }

    fn reset(&mut self) {
        StaticArena::reset(self)
    }

    fn used(&self) -> usize {
        StaticArena::used(self)
    }

    fn capacity(&self) -> usize {
        StaticArena::capacity(self)
    }

    fn last_error(&self) -> Option<&ArenaError> {
        StaticArena::last_error(self)
    }

    fn bytes(&self, allocation: Allocation) -> &[u8] {
        StaticArena::bytes(self, allocation)
    }

    fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        StaticArena::bytes_mut(self, allocation)
    }
}
