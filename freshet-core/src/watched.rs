// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Observable object lifetimes.
//!
//! [`Watched<T>`] is a shared-ownership smart pointer whose deallocation is
//! itself an observable event: when the last owning handle drops, every
//! deinit hook registered on the object runs, once. [`WatchedRef<T>`] is the
//! non-owning companion handle; after the target is gone it upgrades to
//! `None` and observers treat the target as absent.
//!
//! The hook table lives inside the shared cell, so any number of observers
//! of the same object multiplex through one per-object hook rather than each
//! installing their own.

use crate::cancel_handle::CancelHandle;
use crate::lock::Guarded;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct HookTable {
    next_id: u64,
    hooks: HashMap<u64, Hook>,
}

struct Cell<T> {
    value: T,
    table: Guarded<HookTable>,
}

impl<T> Drop for Cell<T> {
    fn drop(&mut self) {
        let hooks = self.table.with_lock(|table| std::mem::take(&mut table.hooks));
        if !hooks.is_empty() {
            tracing::trace!(count = hooks.len(), "running deinit hooks");
        }
        for (_, hook) in hooks {
            hook();
        }
    }
}

/// A shared-ownership handle to a value whose deallocation can be observed.
pub struct Watched<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Watched<T>
where
    T: Send + Sync + 'static,
{
    /// Takes ownership of `value` and makes its deallocation observable.
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(Cell {
                value,
                table: Guarded::new(HookTable::default()),
            }),
        }
    }

    /// Creates a non-owning reference to the value.
    #[must_use]
    pub fn downgrade(&self) -> WatchedRef<T> {
        WatchedRef {
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Registers `hook` to run when the last owning handle drops.
    ///
    /// The returned [`CancelHandle`] deregisters the hook; dropping the
    /// handle deregisters it too, so retain it for as long as the
    /// observation should stand.
    pub fn on_deinit(&self, hook: impl FnOnce() + Send + 'static) -> CancelHandle {
        let id = self.cell.table.with_lock(|table| {
            let id = table.next_id;
            table.next_id += 1;
            table.hooks.insert(id, Box::new(hook));
            id
        });
        // Weak back-reference: the handle must not keep the target alive,
        // and deregistering after the target is gone is a no-op.
        let cell = Arc::downgrade(&self.cell);
        CancelHandle::new(move || {
            if let Some(cell) = cell.upgrade() {
                cell.table.with_lock(|table| {
                    table.hooks.remove(&id);
                });
            }
        })
    }

    /// Number of currently registered deinit hooks.
    pub fn deinit_hook_count(&self) -> usize {
        self.cell.table.with_lock(|table| table.hooks.len())
    }
}

impl<T> Clone for Watched<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> core::ops::Deref for Watched<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.cell.value
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Watched<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Watched").field(&self.cell.value).finish()
    }
}

/// A non-owning reference to a [`Watched`] value.
pub struct WatchedRef<T> {
    cell: Weak<Cell<T>>,
}

impl<T> WatchedRef<T>
where
    T: Send + Sync + 'static,
{
    /// Attempts to recover an owning handle; `None` once the target is gone.
    ///
    /// The returned handle keeps the target alive for its own lifetime, so a
    /// caller working with the upgraded value never races its deallocation.
    #[must_use]
    pub fn upgrade(&self) -> Option<Watched<T>> {
        self.cell.upgrade().map(|cell| Watched { cell })
    }

    /// Returns `true` once the target has been deallocated.
    #[must_use]
    pub fn is_gone(&self) -> bool {
        self.cell.strong_count() == 0
    }
}

impl<T> Clone for WatchedRef<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> core::fmt::Debug for WatchedRef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WatchedRef")
            .field("alive", &(self.cell.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Watched;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn hooks_run_once_when_last_owner_drops() {
        let fired = Arc::new(AtomicU32::new(0));
        let target = Watched::new("value".to_string());
        let second_owner = target.clone();

        let counted = fired.clone();
        let hook = target.on_deinit(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        drop(target);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        drop(second_owner);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        // Deregistering after the fact is a no-op.
        hook.cancel();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_hook_never_fires() {
        let fired = Arc::new(AtomicU32::new(0));
        let target = Watched::new(0u8);
        let counted = fired.clone();
        let hook = target.on_deinit(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });
        hook.cancel();
        assert_eq!(target.deinit_hook_count(), 0);
        drop(target);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn upgrade_fails_after_deallocation() {
        let target = Watched::new(7u32);
        let weak = target.downgrade();
        assert_eq!(weak.upgrade().map(|t| *t), Some(7));
        drop(target);
        assert!(weak.is_gone());
        assert!(weak.upgrade().is_none());
    }
}
