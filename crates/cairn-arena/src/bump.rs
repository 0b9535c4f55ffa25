//! Cursor arithmetic shared by both arena modes.
//!
//! The arena types own storage and error state; the bump math lives here as
//! pure functions so overflow and alignment edge cases can be tested
//! without real storage. All additions are overflow-checked — a request
//! near `usize::MAX` reports an overflow error instead of wrapping.

use cairn_core::ArenaError;

/// Range produced by a successful cursor advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Carve {
    /// Start offset of the new allocation.
    pub start: usize,
    /// Cursor position after the allocation (`start + size`).
    pub end: usize,
}

/// Advance the cursor by `size` bytes with no alignment guarantee.
pub(crate) fn carve(offset: usize, capacity: usize, size: usize) -> Result<Carve, ArenaError> {
    if size == 0 {
        return Err(ArenaError::InvalidSize);
    }
    match offset.checked_add(size) {
        Some(end) if end <= capacity => Ok(Carve { start: offset, end }),
        _ => Err(ArenaError::CapacityExceeded {
            requested: size,
            remaining: capacity - offset,
            capacity,
        }),
    }
}

/// Advance the cursor to the next `alignment`-aligned address, then by `size`.
///
/// `base` is the integer value of the storage's base address. Alignment is
/// computed against `base + offset`, so the result is correct for storage
/// with an arbitrarily aligned base. On failure the caller's cursor is left
/// untouched and the skipped padding is never committed.
pub(crate) fn carve_aligned(
    base: usize,
    offset: usize,
    capacity: usize,
    size: usize,
    alignment: usize,
) -> Result<Carve, ArenaError> {
    if size == 0 {
        return Err(ArenaError::InvalidSize);
    }
    if alignment == 0 || !alignment.is_power_of_two() {
        return Err(ArenaError::InvalidAlignment { alignment });
    }

    // offset <= capacity and base..base+capacity is a live address range,
    // so this sum cannot wrap for storage that actually exists.
    let addr = base.wrapping_add(offset);
    let padding = (alignment - (addr % alignment)) % alignment;

    match offset
        .checked_add(padding)
        .and_then(|start| start.checked_add(size).map(|end| (start, end)))
    {
        Some((start, end)) if end <= capacity => Ok(Carve { start, end }),
        _ => Err(ArenaError::AlignedCapacityExceeded {
            requested: size,
            padding,
            remaining: capacity - offset,
            capacity,
        }),
    }
}
