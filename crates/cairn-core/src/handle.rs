//! Allocation handles.
//!
//! An [`Allocation`] records the byte range a successful allocation carved
//! out of its arena. Handles are plain offsets — they borrow nothing, so
//! callers can hold any number of them while continuing to allocate, and
//! resolve them to byte slices through the owning arena's `bytes` /
//! `bytes_mut` accessors.

use std::fmt;

/// Byte range carved out of an arena by a successful allocation.
///
/// The range `[offset, offset + len)` is relative to the owning arena's
/// storage base. A handle stays valid until that arena is reset; resolving
/// it afterwards returns whatever bytes now occupy the range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    offset: usize,
    len: usize,
}

impl Allocation {
    /// Create a handle for the given range.
    ///
    /// Normally only called by the arena that carved the range; a handle
    /// built by hand may panic when resolved against an arena that never
    /// issued it.
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Start offset within the arena's storage.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the allocation in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation. Arenas never issue one.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One-past-the-end offset of the allocation.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation(off={}, len={})", self.offset, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trip() {
        let a = Allocation::new(64, 128);
        assert_eq!(a.offset(), 64);
        assert_eq!(a.len(), 128);
        assert_eq!(a.end(), 192);
        assert!(!a.is_empty());
    }

    #[test]
    fn display_shows_range() {
        let a = Allocation::new(0, 16);
        assert_eq!(a.to_string(), "Allocation(off=0, len=16)");
    }
}
