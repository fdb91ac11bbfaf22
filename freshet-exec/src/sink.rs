// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{
    AnySubscription, Completion, Demand, Guarded, Subscriber, Subscription,
};
use std::sync::Arc;

type ValueHandler<T> = Box<dyn Fn(T) + Send + Sync>;
type CompletionHandler<E> = Box<dyn Fn(Completion<E>) + Send + Sync>;

struct SinkInner<T, E> {
    on_value: ValueHandler<T>,
    on_completion: CompletionHandler<E>,
    subscription: Guarded<Option<AnySubscription>>,
}

/// The plain closure consumer: requests unlimited demand and hands every
/// value (and the terminal signal) to the supplied closures.
///
/// The sink retains its subscription internally, so the stream stays live
/// for as long as the sink (or any clone of it) exists. Call
/// [`cancel`](Sink::cancel) to stop delivery early.
pub struct Sink<T, E> {
    inner: Arc<SinkInner<T, E>>,
}

impl<T, E> Sink<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// A sink with a value handler and a completion handler.
    pub fn new(
        on_value: impl Fn(T) + Send + Sync + 'static,
        on_completion: impl Fn(Completion<E>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                on_value: Box::new(on_value),
                on_completion: Box::new(on_completion),
                subscription: Guarded::new(None),
            }),
        }
    }

    /// A sink that only cares about values.
    pub fn values(on_value: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::new(on_value, |_completion| {})
    }

    /// Stops delivery. Idempotent.
    pub fn cancel(&self) {
        if let Some(subscription) = self.inner.subscription.with_lock(Option::take) {
            subscription.cancel();
        }
    }

    /// Returns `true` while the sink holds a live subscription.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.inner.subscription.with_lock(|slot| slot.is_some())
    }
}

impl<T, E> Clone for Sink<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Subscriber for Sink<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&self, subscription: AnySubscription) {
        self.inner
            .subscription
            .with_lock(|slot| *slot = Some(subscription.clone()));
        subscription.request(Demand::Unlimited);
    }

    fn receive(&self, input: T) -> Demand {
        (self.inner.on_value)(input);
        Demand::none()
    }

    fn receive_completion(&self, completion: Completion<E>) {
        (self.inner.on_completion)(completion);
        // The stream is over; release the subscription's resources.
        self.inner.subscription.with_lock(Option::take);
    }
}
