//! Arena-specific error types.
//!
//! Every failure path in the arena maps to a distinct variant here. No
//! operation aborts the process: failures are returned as `Err` values and
//! additionally recorded on the failing arena (or, for construction
//! failures, in the process-wide slot) for later inspection.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A zero-byte allocation was requested.
    InvalidSize,
    /// The requested alignment is zero or not a power of two.
    InvalidAlignment {
        /// The rejected alignment value.
        alignment: usize,
    },
    /// The allocation would advance the cursor past the arena's capacity.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes still free at the time of the request.
        remaining: usize,
        /// Total capacity of the arena.
        capacity: usize,
    },
    /// An aligned allocation would advance the cursor past the arena's
    /// capacity once alignment padding is accounted for.
    AlignedCapacityExceeded {
        /// Number of bytes requested (excluding padding).
        requested: usize,
        /// Padding bytes needed to reach the aligned address.
        padding: usize,
        /// Bytes still free at the time of the request.
        remaining: usize,
        /// Total capacity of the arena.
        capacity: usize,
    },
    /// The storage provider could not supply a backing region.
    StorageExhausted {
        /// Number of bytes requested from the provider.
        requested: usize,
    },
    /// The static arena region is already claimed by a live instance.
    AlreadyClaimed,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize => write!(f, "invalid allocation size"),
            Self::InvalidAlignment { alignment } => {
                write!(f, "alignment must be a power of two (got {alignment})")
            }
            Self::CapacityExceeded {
                requested,
                remaining,
                capacity,
            } => {
                write!(
                    f,
                    "arena overflow: requested {requested} bytes, {remaining} of {capacity} bytes free"
                )
            }
            Self::AlignedCapacityExceeded {
                requested,
                padding,
                remaining,
                capacity,
            } => {
                write!(
                    f,
                    "arena overflow (aligned): requested {requested} bytes plus {padding} padding, \
                     {remaining} of {capacity} bytes free"
                )
            }
            Self::StorageExhausted { requested } => {
                write!(f, "out of memory: could not acquire {requested} bytes of backing storage")
            }
            Self::AlreadyClaimed => write!(f, "static arena already in use"),
        }
    }
}

impl Error for ArenaError {}
