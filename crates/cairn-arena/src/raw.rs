//! Low-level claim machinery for the static arena's backing region.
//!
//! This is the only module in the workspace containing `unsafe` code. It
//! owns the process-wide static byte region and the claim flag that
//! guarantees at most one outstanding `&mut` borrow of that region. Each
//! `unsafe` use carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::static_arena::STATIC_CAPACITY;

struct StaticStorage(UnsafeCell<[u8; STATIC_CAPACITY]>);

// SAFETY: all access to the inner buffer is gated by `CLAIMED`; `try_claim`
// hands out at most one `&mut` at a time.
unsafe impl Sync for StaticStorage {}

static STORAGE: StaticStorage = StaticStorage(UnsafeCell::new([0; STATIC_CAPACITY]));
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Claim exclusive access to the static region.
///
/// Returns `None` if the region is already claimed. The caller must stop
/// using the returned borrow before [`unclaim`] runs.
pub(crate) fn try_claim() -> Option<&'static mut [u8]> {
    if CLAIMED.swap(true, Ordering::AcqRel) {
        return None;
    }
    // SAFETY: the swap above made this caller the sole claimant, so no
    // other `&mut` into STORAGE exists until `unclaim`, and claimants do
    // not touch the region after releasing.
    let region: &'static mut [u8] = unsafe { &mut (&mut (*STORAGE.0.get()))[..] };
    Some(region)
}

/// Return the static region to the unclaimed state.
///
/// The borrow handed out by [`try_claim`] must be dead by the time this is
/// called; the next `try_claim` will alias it otherwise.
pub(crate) fn unclaim() {
    CLAIMED.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_serial;

    #[test]
    fn claim_is_exclusive_until_unclaimed() {
        let _serial = test_serial::GLOBAL_STATE
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let region = try_claim().unwrap();
        assert_eq!(region.len(), STATIC_CAPACITY);
        assert!(try_claim().is_none());

        unclaim();
        let region = try_claim().unwrap();
        assert_eq!(region.len(), STATIC_CAPACITY);
        unclaim();
    }
}
