//! Core types and traits for the cairn arena allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the typed error enum, the allocation handle, and the collaborator
//! traits through which `cairn-arena` talks to its environment: the
//! backing-storage provider and the optional lock hooks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod traits;

// Public re-exports for the primary API surface.
pub use error::ArenaError;
pub use handle::Allocation;
pub use traits::{ArenaAlloc, HeapStorage, LockHooks, NoopHooks, StorageProvider};
