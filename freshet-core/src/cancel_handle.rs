// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::lock::Guarded;

type CancelAction = Box<dyn FnOnce() + Send>;

/// A one-shot cancellation action, run on [`cancel`](CancelHandle::cancel)
/// or when the handle drops - whichever happens first, exactly once.
///
/// The action may be invoked from any thread; it is stored behind the lock
/// primitive and taken out before running, so concurrent and repeated
/// cancellation are no-ops.
#[must_use = "dropping a CancelHandle runs its cancellation action"]
pub struct CancelHandle {
    action: Guarded<Option<CancelAction>>,
}

impl CancelHandle {
    /// Wraps a cancellation action.
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Guarded::new(Some(Box::new(action))),
        }
    }

    /// A handle whose cancellation does nothing.
    pub fn noop() -> Self {
        Self {
            action: Guarded::new(None),
        }
    }

    /// Runs the action if it has not run yet.
    pub fn cancel(&self) {
        if let Some(action) = self.action.with_lock(Option::take) {
            action();
        }
    }

    /// Returns `true` once the action has run (or never existed).
    pub fn is_cancelled(&self) -> bool {
        self.action.with_lock(|slot| slot.is_none())
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::CancelHandle;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_exactly_once_across_cancel_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();
        let handle = CancelHandle::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        handle.cancel();
        drop(handle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn runs_on_drop_when_never_cancelled() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();
        drop(CancelHandle::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
