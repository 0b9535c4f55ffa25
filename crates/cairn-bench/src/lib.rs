//! Benchmark profiles and helpers for the cairn arena workspace.
//!
//! Provides the capacity profiles and fill-cycle drivers shared by the
//! `arena_ops` benchmarks, kept here so they carry unit tests.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cairn_arena::HeapArena;

/// Small profile: 64 KiB, refilled many times per benchmark run.
pub const SMALL_CAPACITY: usize = 64 * 1024;

/// Large profile: 4 MiB, big enough that per-iteration resets are rare.
pub const LARGE_CAPACITY: usize = 4 * 1024 * 1024;

/// Fill the arena with `chunk`-byte allocations until it overflows, then
/// reset it. Returns the number of allocations that succeeded.
pub fn fill_cycle(arena: &mut HeapArena, chunk: usize) -> usize {
    let mut count = 0;
    while arena.alloc(chunk).is_ok() {
        count += 1;
    }
    arena.reset();
    count
}

/// Like [`fill_cycle`] but with aligned allocations, so each cycle pays
/// the padding arithmetic.
pub fn aligned_fill_cycle(arena: &mut HeapArena, chunk: usize, alignment: usize) -> usize {
    let mut count = 0;
    while arena.alloc_aligned(chunk, alignment).is_ok() {
        count += 1;
    }
    arena.reset();
    count
}
