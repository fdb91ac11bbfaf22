// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Publisher that emits once when a watched object is deallocated.

use crate::cancel_handle::CancelHandle;
use crate::completion::{Completion, Never};
use crate::demand::Demand;
use crate::lock::Guarded;
use crate::publisher::Publisher;
use crate::subscriber::{AnySubscriber, Subscriber};
use crate::subscription::{AnySubscription, Subscription};
use crate::watched::{Watched, WatchedRef};
use std::sync::Arc;

/// A publisher that delivers `()` followed by [`Completion::Finished`] at
/// the moment its target is deallocated.
///
/// The target is held weakly. All subscriptions against the same target
/// share the single per-object hook table inside the target's
/// [`Watched`] cell; each subscription registers a removable callback there
/// on its first positive demand request and deregisters on cancellation.
/// If the target is already gone at registration time, delivery happens
/// immediately and synchronously.
///
/// This publisher cannot fail; its failure type is [`Never`].
pub struct OnDeinit<T> {
    target: WatchedRef<T>,
}

impl<T> OnDeinit<T>
where
    T: Send + Sync + 'static,
{
    /// Observes the target behind an existing weak reference.
    pub fn new(target: WatchedRef<T>) -> Self {
        Self { target }
    }

    /// Observes a live target.
    pub fn of(target: &Watched<T>) -> Self {
        Self::new(target.downgrade())
    }
}

impl<T> Clone for OnDeinit<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T> Publisher for OnDeinit<T>
where
    T: Send + Sync + 'static,
{
    type Output = ();
    type Failure = Never;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = (), Failure = Never> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);
        let inner = Arc::new(DeinitInner {
            target: self.target.clone(),
            state: Guarded::new(DeinitState {
                downstream: Some(downstream.clone()),
                hook: None,
                registered: false,
            }),
        });
        downstream.receive_subscription(AnySubscription::new(DeinitSubscription { inner }));
    }
}

struct DeinitState {
    downstream: Option<AnySubscriber<(), Never>>,
    hook: Option<CancelHandle>,
    registered: bool,
}

struct DeinitInner<T> {
    target: WatchedRef<T>,
    state: Guarded<DeinitState>,
}

impl<T> DeinitInner<T>
where
    T: Send + Sync + 'static,
{
    /// Delivers the single value and the terminal signal, once.
    fn finish(&self) {
        let downstream = self.state.with_lock(|s| s.downstream.take());
        if let Some(downstream) = downstream {
            let _ = downstream.receive(());
            downstream.receive_completion(Completion::Finished);
        }
    }

    fn shut_down(&self) {
        let taken = self.state.with_lock(|s| (s.downstream.take(), s.hook.take()));
        // Dropping the hook handle deregisters it from the target.
        drop(taken);
    }
}

struct DeinitSubscription<T>
where
    T: Send + Sync + 'static,
{
    inner: Arc<DeinitInner<T>>,
}

impl<T> Subscription for DeinitSubscription<T>
where
    T: Send + Sync + 'static,
{
    fn request(&self, demand: Demand) {
        if demand.is_none() {
            return;
        }
        let register = self.inner.state.with_lock(|s| {
            if s.registered || s.downstream.is_none() {
                false
            } else {
                s.registered = true;
                true
            }
        });
        if !register {
            return;
        }

        match self.inner.target.upgrade() {
            None => self.inner.finish(),
            Some(target) => {
                let observer = Arc::downgrade(&self.inner);
                let hook = target.on_deinit(move || {
                    if let Some(inner) = observer.upgrade() {
                        inner.finish();
                    }
                });
                let dead_on_arrival = self.inner.state.with_lock(|s| {
                    if s.downstream.is_none() {
                        Some(hook)
                    } else {
                        s.hook = Some(hook);
                        None
                    }
                });
                drop(dead_on_arrival);
            }
        }
    }

    fn cancel(&self) {
        self.inner.shut_down();
    }
}

impl<T> Drop for DeinitSubscription<T>
where
    T: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.inner.shut_down();
    }
}
