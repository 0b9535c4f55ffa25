//! Fixed-capacity bump-pointer arena allocation.
//!
//! An arena is a contiguous byte region plus a cursor: allocations carve
//! sequential sub-ranges in O(1), there is no per-allocation free, and
//! `reset` reclaims everything at once by rewinding the cursor. Two
//! operating modes, chosen at build time by picking a type:
//!
//! ```text
//! HeapArena (dynamic mode)             StaticArena (fixed-storage mode)
//! ├── Box<[u8]> from StorageProvider   ├── &'static mut [u8] from raw claim
//! ├── destroy() returns the region     ├── release() unclaims the singleton
//! └── capacity chosen at construction  └── capacity = STATIC_CAPACITY
//!            │                                     │
//!            └──── bump::carve / carve_aligned ────┘
//!                  (shared cursor arithmetic)
//! ```
//!
//! Allocations come back as [`Allocation`] offset handles; byte access goes
//! through `bytes` / `bytes_mut` on the owning arena. Both modes wrap every
//! mutating operation in the optional [`LockHooks`] critical section for
//! callers that share one arena across threads.
//!
//! This crate is the only one in the workspace that may contain `unsafe`
//! code, bounded to the `raw` module (the static region's claim machinery),
//! with a mandatory `// SAFETY:` comment on each use.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod bump;
pub mod heap;
mod lock;
mod raw;
mod report;
pub mod static_arena;

// Public re-exports for the primary API surface.
pub use cairn_core::{
    Allocation, ArenaAlloc, ArenaError, HeapStorage, LockHooks, NoopHooks, StorageProvider,
};
pub use heap::HeapArena;
pub use report::construction_error;
pub use static_arena::{StaticArena, STATIC_CAPACITY};
