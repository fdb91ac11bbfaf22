// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Manual producer driven by a user-supplied closure.

use crate::cancel_handle::CancelHandle;
use crate::completion::Completion;
use crate::demand::Demand;
use crate::lock::Guarded;
use crate::publisher::Publisher;
use crate::subscriber::{AnySubscriber, Subscriber};
use crate::subscription::{AnySubscription, Subscription};
use std::sync::Arc;

type Factory<T, E> = dyn Fn(AnySubscriber<T, E>) -> CancelHandle + Send + Sync;

/// A publisher that defers all work to a factory closure.
///
/// Nothing runs at subscribe time: the subscriber is handed its subscription
/// immediately, and the factory is invoked once the first positive demand
/// arrives. The factory drives the subscriber it is given and returns a
/// [`CancelHandle`] that is run exactly once - on cancellation, on terminal
/// delivery, or when the last subscription handle drops without either.
///
/// `Create` is an unconditional pusher: it does not meter the factory's
/// emissions against demand, but cancellation and the one-terminal rule are
/// enforced on everything the factory sends.
///
/// ```
/// use freshet_core::{CancelHandle, Completion, Create, Subscriber};
///
/// let numbers = Create::<i32, freshet_core::Never>::new(|subscriber| {
///     subscriber.receive(1);
///     subscriber.receive(2);
///     subscriber.receive_completion(Completion::Finished);
///     CancelHandle::noop()
/// });
/// ```
pub struct Create<T, E> {
    factory: Arc<Factory<T, E>>,
}

impl<T, E> Create<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wraps a factory closure.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(AnySubscriber<T, E>) -> CancelHandle + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }
}

impl<T, E> Clone for Create<T, E> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
        }
    }
}

impl<T, E> Publisher for Create<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);
        let inner = Arc::new(CreateInner {
            factory: self.factory.clone(),
            state: Guarded::new(CreateState {
                downstream: Some(downstream.clone()),
                handle: None,
                started: false,
                terminated: false,
            }),
        });
        downstream.receive_subscription(AnySubscription::new(CreateSubscription { inner }));
    }
}

struct CreateState<T, E> {
    downstream: Option<AnySubscriber<T, E>>,
    handle: Option<CancelHandle>,
    started: bool,
    terminated: bool,
}

struct CreateInner<T, E> {
    factory: Arc<Factory<T, E>>,
    state: Guarded<CreateState<T, E>>,
}

impl<T, E> CreateInner<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn shut_down(&self) {
        let taken = self.state.with_lock(|s| {
            if s.terminated {
                None
            } else {
                s.terminated = true;
                Some((s.downstream.take(), s.handle.take()))
            }
        });
        // Drop outside the lock: the cancel action is user code.
        drop(taken);
    }
}

struct CreateSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    inner: Arc<CreateInner<T, E>>,
}

impl<T, E> Subscription for CreateSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn request(&self, demand: Demand) {
        if demand.is_none() {
            return;
        }
        let start = self.inner.state.with_lock(|s| {
            if s.started || s.terminated {
                false
            } else {
                s.started = true;
                true
            }
        });
        if !start {
            return;
        }

        let forwarder = AnySubscriber::new(CreateForwarder {
            inner: self.inner.clone(),
        });
        let handle = (self.inner.factory)(forwarder);

        // The factory may have delivered a terminal, or another thread may
        // have cancelled, while it ran. In that case the handle is dead on
        // arrival and must run now rather than be stored.
        let dead_on_arrival = self.inner.state.with_lock(|s| {
            if s.terminated {
                Some(handle)
            } else {
                s.handle = Some(handle);
                None
            }
        });
        drop(dead_on_arrival);
    }

    fn cancel(&self) {
        self.inner.shut_down();
    }
}

impl<T, E> Drop for CreateSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn drop(&mut self) {
        // Released without explicit cancellation: stop the work anyway.
        self.inner.shut_down();
    }
}

/// The subscriber handed to the factory. Gates everything the factory sends
/// through the shared subscription state, so cancellation and the
/// one-terminal rule hold no matter what the factory does.
struct CreateForwarder<T, E> {
    inner: Arc<CreateInner<T, E>>,
}

impl<T, E> Subscriber for CreateForwarder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&self, _subscription: AnySubscription) {}

    fn receive(&self, input: T) -> Demand {
        let downstream = self.inner.state.with_lock(|s| {
            if s.terminated {
                None
            } else {
                s.downstream.clone()
            }
        });
        match downstream {
            Some(downstream) => downstream.receive(input),
            None => Demand::none(),
        }
    }

    fn receive_completion(&self, completion: Completion<E>) {
        let taken = self.inner.state.with_lock(|s| {
            if s.terminated {
                None
            } else {
                s.terminated = true;
                Some((s.downstream.take(), s.handle.take()))
            }
        });
        if let Some((downstream, handle)) = taken {
            if let Some(downstream) = downstream {
                downstream.receive_completion(completion);
            }
            drop(handle);
        }
    }
}
