//! Process-wide error slot for failures with no arena to record them.
//!
//! Construction can fail before any instance exists (provider exhaustion,
//! a rejected size, a double claim of the static region). Those failures
//! land here so callers can still diagnose them after the fact. The slot
//! has no other role; per-instance failures are recorded on the instance.

use std::sync::Mutex;

use cairn_core::ArenaError;

static SLOT: Mutex<Option<ArenaError>> = Mutex::new(None);

/// The most recent construction failure, or `None` if none has occurred
/// since the last successful destroy.
pub fn construction_error() -> Option<ArenaError> {
    SLOT.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Record a failure that has no instance to hold it.
pub(crate) fn record(err: ArenaError) {
    *SLOT.lock().unwrap_or_else(|e| e.into_inner()) = Some(err);
}

/// Clear the slot.
pub(crate) fn clear() {
    *SLOT.lock().unwrap_or_else(|e| e.into_inner()) = None;
}
