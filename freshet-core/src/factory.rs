// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Trivial single-shot publishers.

use crate::completion::{Completion, Never};
use crate::demand::Demand;
use crate::lock::Guarded;
use crate::publisher::Publisher;
use crate::subscriber::{AnySubscriber, Subscriber};
use crate::subscription::{AnySubscription, Subscription};
use std::sync::Arc;

/// Emits one value, then finishes.
///
/// Like every producer in this crate, delivery is demand-lazy: the value is
/// held until the subscriber's first positive request.
#[derive(Clone, Debug)]
pub struct Just<T> {
    value: T,
}

impl<T> Just<T>
where
    T: Clone + Send + 'static,
{
    /// Wraps the value to emit.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Publisher for Just<T>
where
    T: Clone + Send + 'static,
{
    type Output = T;
    type Failure = Never;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = Never> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);
        downstream.receive_subscription(AnySubscription::new(JustSubscription {
            state: Guarded::new(Some((self.value.clone(), downstream.clone()))),
        }));
    }
}

struct JustSubscription<T> {
    state: Guarded<Option<(T, AnySubscriber<T, Never>)>>,
}

impl<T> Subscription for JustSubscription<T>
where
    T: Send + 'static,
{
    fn request(&self, demand: Demand) {
        if demand.is_none() {
            return;
        }
        if let Some((value, downstream)) = self.state.with_lock(Option::take) {
            let _ = downstream.receive(value);
            downstream.receive_completion(Completion::Finished);
        }
    }

    fn cancel(&self) {
        self.state.with_lock(Option::take);
    }
}

/// Finishes immediately, emitting nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Empty<T> {
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T> Empty<T>
where
    T: Send + 'static,
{
    /// An empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: core::marker::PhantomData,
        }
    }
}

impl<T> Publisher for Empty<T>
where
    T: Send + 'static,
{
    type Output = T;
    type Failure = Never;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = Never> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);
        downstream.receive_subscription(AnySubscription::new(InertSubscription));
        downstream.receive_completion(Completion::Finished);
    }
}

/// Fails immediately with a stored error.
#[derive(Clone, Debug)]
pub struct Fail<T, E> {
    error: E,
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T, E> Fail<T, E>
where
    T: Send + 'static,
    E: Clone + Send + 'static,
{
    /// Wraps the error to fail with.
    pub fn new(error: E) -> Self {
        Self {
            error,
            _marker: core::marker::PhantomData,
        }
    }
}

impl<T, E> Publisher for Fail<T, E>
where
    T: Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);
        downstream.receive_subscription(AnySubscription::new(InertSubscription));
        downstream.receive_completion(Completion::Failed(self.error.clone()));
    }
}

/// A subscription with nothing to coordinate: the publisher terminates at
/// subscribe time and demand is irrelevant.
struct InertSubscription;

impl Subscription for InertSubscription {
    fn request(&self, _demand: Demand) {}

    fn cancel(&self) {}
}
