// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::completion::Completion;
use crate::demand::Demand;
use crate::subscription::AnySubscription;
use std::sync::Arc;

/// An entity that accepts a subscription, values, and exactly one terminal
/// signal.
///
/// A well-behaved publisher calls, in order: [`receive_subscription`] once,
/// [`receive`] zero or more times (never exceeding outstanding demand unless
/// the publisher is an unconditional pusher), and [`receive_completion`] at
/// most once, after which the subscription is dead.
///
/// Methods take `&self`: subscribers are shared across threads as trait
/// objects and manage any mutable state through interior mutability.
///
/// [`receive_subscription`]: Subscriber::receive_subscription
/// [`receive`]: Subscriber::receive
/// [`receive_completion`]: Subscriber::receive_completion
pub trait Subscriber: Send + Sync {
    /// The type of values this subscriber accepts.
    type Input;
    /// The failure type of the terminal signal.
    type Failure;

    /// Hands the subscriber its subscription. The subscriber typically
    /// retains the handle and issues its first demand here.
    fn receive_subscription(&self, subscription: AnySubscription);

    /// Delivers one value. The returned demand is added to the
    /// subscription's outstanding credit.
    fn receive(&self, input: Self::Input) -> Demand;

    /// Delivers the terminal signal. Nothing arrives after this.
    fn receive_completion(&self, completion: Completion<Self::Failure>);
}

/// A cloneable, type-erased [`Subscriber`] handle.
pub struct AnySubscriber<T, E> {
    inner: Arc<dyn Subscriber<Input = T, Failure = E>>,
}

impl<T, E> AnySubscriber<T, E> {
    /// Erases a concrete subscriber.
    pub fn new(subscriber: impl Subscriber<Input = T, Failure = E> + 'static) -> Self {
        Self {
            inner: Arc::new(subscriber),
        }
    }

    /// Wraps an already shared subscriber without another allocation.
    pub fn from_arc(subscriber: Arc<dyn Subscriber<Input = T, Failure = E>>) -> Self {
        Self { inner: subscriber }
    }
}

impl<T, E> Clone for AnySubscriber<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Subscriber for AnySubscriber<T, E>
where
    T: Send,
    E: Send,
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&self, subscription: AnySubscription) {
        self.inner.receive_subscription(subscription);
    }

    fn receive(&self, input: T) -> Demand {
        self.inner.receive(input)
    }

    fn receive_completion(&self, completion: Completion<E>) {
        self.inner.receive_completion(completion);
    }
}

impl<T, E> core::fmt::Debug for AnySubscriber<T, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnySubscriber").finish_non_exhaustive()
    }
}
