//! Critical-section guard for the optional lock hooks.

use std::sync::Arc;

use cairn_core::LockHooks;

/// RAII guard holding the hook critical section.
///
/// Acquires on construction and releases on drop, so every return path out
/// of a mutating arena operation — success or early error — releases
/// exactly once. The arena never nests guards, preserving the
/// non-reentrancy contract of [`LockHooks`].
#[must_use]
pub(crate) struct HookGuard {
    hooks: Arc<dyn LockHooks>,
}

impl HookGuard {
    /// Enter the critical section.
    pub(crate) fn enter(hooks: &Arc<dyn LockHooks>) -> Self {
        hooks.acquire();
        Self {
            hooks: Arc::clone(hooks),
        }
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.hooks.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicIsize, Ordering};

    /// Hooks that track critical-section depth, failing on imbalance.
    struct DepthHooks {
        depth: AtomicIsize,
    }

    impl LockHooks for DepthHooks {
        fn acquire(&self) {
            let prev = self.depth.fetch_add(1, Ordering::SeqCst);
            assert_eq!(prev, 0, "critical section reentered");
        }

        fn release(&self) {
            let prev = self.depth.fetch_sub(1, Ordering::SeqCst);
            assert_eq!(prev, 1, "release without acquire");
        }
    }

    #[test]
    fn guard_releases_on_drop() {
        let hooks: Arc<dyn LockHooks> = Arc::new(DepthHooks {
            depth: AtomicIsize::new(0),
        });
        {
            let _guard = HookGuard::enter(&hooks);
        }
        // A second entry succeeds only if the first was released.
        let _guard = HookGuard::enter(&hooks);
    }

    #[test]
    fn guard_releases_on_early_return() {
        fn failing_op(hooks: &Arc<dyn LockHooks>) -> Result<(), ()> {
            let _guard = HookGuard::enter(hooks);
            Err(())
        }

        let hooks: Arc<dyn LockHooks> = Arc::new(DepthHooks {
            depth: AtomicIsize::new(0),
        });
        assert!(failing_op(&hooks).is_err());
        let _guard = HookGuard::enter(&hooks);
    }
}
