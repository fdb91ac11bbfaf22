// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{
    AnySubscription, CancelHandle, Completion, Demand, Guarded, Never, Subscriber, Subscription,
    Watched, WatchedRef,
};
use freshet_runtime::Scheduler;
use std::sync::Arc;

/// A subscriber that binds stream values onto a weakly-held target, on a
/// confined scheduler.
///
/// Three guarantees:
///
/// - the target is never kept alive by the binding: it is held weakly and
///   re-checked inside every scheduled delivery;
/// - the binding closure runs where the scheduler says, so a run-loop
///   scheduler confines all target mutation to its thread;
/// - when the target is deallocated, the upstream subscription is cancelled
///   through the target's deinit hook, so no producer keeps working for a
///   consumer that is gone.
///
/// The binder requests unlimited demand - it applies no backpressure of its
/// own, the binding closure being assumed a cheap, idempotent mutation.
/// Terminal signals are intentionally ignored: the target has no
/// representation of stream termination.
///
/// ```
/// use freshet_core::{Publisher, ReplaySubject, Never, Watched};
/// use freshet_exec::Binder;
/// use freshet_runtime::RunLoop;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let run_loop = RunLoop::new("ui").unwrap();
/// let label = Watched::new(AtomicU32::new(0));
///
/// let subject = ReplaySubject::<u32, Never>::default();
/// subject.subscribe(Binder::new(&label, run_loop.scheduler(), |label, value| {
///     label.store(value, Ordering::SeqCst);
/// }));
///
/// subject.send(42);
/// ```
pub struct Binder<T, I, S> {
    target: WatchedRef<T>,
    scheduler: S,
    binding: Arc<dyn Fn(&T, I) + Send + Sync>,
    hook: Guarded<Option<CancelHandle>>,
}

impl<T, I, S> Binder<T, I, S>
where
    T: Send + Sync + 'static,
    I: Send + 'static,
    S: Scheduler,
{
    /// Binds a live target.
    pub fn new(
        target: &Watched<T>,
        scheduler: S,
        binding: impl Fn(&T, I) + Send + Sync + 'static,
    ) -> Self {
        Self::from_ref(target.downgrade(), scheduler, binding)
    }

    /// Binds a target behind an existing weak reference.
    pub fn from_ref(
        target: WatchedRef<T>,
        scheduler: S,
        binding: impl Fn(&T, I) + Send + Sync + 'static,
    ) -> Self {
        Self {
            target,
            scheduler,
            binding: Arc::new(binding),
            hook: Guarded::new(None),
        }
    }
}

impl<T, I, S> Subscriber for Binder<T, I, S>
where
    T: Send + Sync + 'static,
    I: Send + 'static,
    S: Scheduler,
{
    type Input = I;
    type Failure = Never;

    fn receive_subscription(&self, subscription: AnySubscription) {
        match self.target.upgrade() {
            Some(target) => {
                // Couple the subscription to the target's lifetime: the
                // upstream stops the moment its only consumer is gone.
                let upstream = subscription.clone();
                let hook = target.on_deinit(move || {
                    tracing::trace!("binder target deallocated; cancelling upstream");
                    upstream.cancel();
                });
                self.hook.with_lock(|slot| *slot = Some(hook));
                subscription.request(Demand::Unlimited);
            }
            None => subscription.cancel(),
        }
    }

    fn receive(&self, input: I) -> Demand {
        if self.target.is_gone() {
            return Demand::none();
        }
        let target = self.target.clone();
        let binding = self.binding.clone();
        self.scheduler.schedule(Box::new(move || {
            // Re-check on the confined thread; the target may have dropped
            // between scheduling and execution.
            if let Some(target) = target.upgrade() {
                binding(&target, input);
            }
        }));
        Demand::Unlimited
    }

    fn receive_completion(&self, _completion: Completion<Never>) {}
}
