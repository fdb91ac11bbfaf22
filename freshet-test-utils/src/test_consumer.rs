// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{AnySubscription, Completion, Demand, Guarded, Subscriber, Subscription};
use std::sync::Arc;

/// One recorded delivery.
#[derive(Clone, Debug, PartialEq)]
pub enum TestEvent<T, E> {
    Value(T),
    Completion(Completion<E>),
}

type DemandPolicy = Box<dyn Fn(usize) -> Demand + Send + Sync>;
type ValueHook<T> = Box<dyn Fn(&T) + Send + Sync>;

struct ConsumerInner<T, E> {
    events: Guarded<Vec<TestEvent<T, E>>>,
    subscription: Guarded<Option<AnySubscription>>,
    initial_demand: Demand,
    additional_demand: Option<DemandPolicy>,
    on_value: Option<ValueHook<T>>,
}

/// A subscriber that records everything it receives.
///
/// Demand is configurable in two places, mirroring how a real consumer
/// grants credit: `initial_demand` is requested when the subscription
/// arrives, and `additional_demand` (given the running value count) is
/// returned from each delivery.
pub struct TestConsumer<T, E> {
    inner: Arc<ConsumerInner<T, E>>,
}

impl<T, E> TestConsumer<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// A consumer that requests unlimited demand up front.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::with_demand(Demand::Unlimited)
    }

    /// A consumer that requests `initial_demand` up front and returns no
    /// additional demand from deliveries.
    #[must_use]
    pub fn with_demand(initial_demand: Demand) -> Self {
        Self {
            inner: Arc::new(ConsumerInner {
                events: Guarded::new(Vec::new()),
                subscription: Guarded::new(None),
                initial_demand,
                additional_demand: None,
                on_value: None,
            }),
        }
    }

    /// Returns additional demand from each delivery, computed from the
    /// number of values received so far (1-based).
    #[must_use]
    pub fn additional_demand(
        self,
        policy: impl Fn(usize) -> Demand + Send + Sync + 'static,
    ) -> Self {
        let inner = Arc::try_unwrap(self.inner)
            .unwrap_or_else(|_| panic!("configure TestConsumer before sharing it"));
        Self {
            inner: Arc::new(ConsumerInner {
                additional_demand: Some(Box::new(policy)),
                ..inner
            }),
        }
    }

    /// Runs a hook inside every value delivery, before it is recorded.
    #[must_use]
    pub fn on_value(self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        let inner = Arc::try_unwrap(self.inner)
            .unwrap_or_else(|_| panic!("configure TestConsumer before sharing it"));
        Self {
            inner: Arc::new(ConsumerInner {
                on_value: Some(Box::new(hook)),
                ..inner
            }),
        }
    }

    pub fn events(&self) -> Vec<TestEvent<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        self.inner.events.cloned()
    }

    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
        E: Clone,
    {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TestEvent::Value(value) => Some(value),
                TestEvent::Completion(_) => None,
            })
            .collect()
    }

    pub fn completions(&self) -> Vec<Completion<E>>
    where
        T: Clone,
        E: Clone,
    {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TestEvent::Value(_) => None,
                TestEvent::Completion(completion) => Some(completion),
            })
            .collect()
    }

    pub fn value_count(&self) -> usize {
        self.inner.events.with_lock(|events| {
            events
                .iter()
                .filter(|event| matches!(event, TestEvent::Value(_)))
                .count()
        })
    }

    pub fn completion_count(&self) -> usize {
        self.inner.events.with_lock(|events| {
            events
                .iter()
                .filter(|event| matches!(event, TestEvent::Completion(_)))
                .count()
        })
    }

    pub fn has_subscription(&self) -> bool {
        self.inner.subscription.with_lock(|slot| slot.is_some())
    }

    /// Grants further demand through the recorded subscription.
    pub fn request(&self, demand: Demand) {
        let subscription = self.inner.subscription.cloned();
        if let Some(subscription) = subscription {
            subscription.request(demand);
        }
    }

    /// Cancels the recorded subscription.
    pub fn cancel(&self) {
        let subscription = self.inner.subscription.cloned();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    /// Drops the retained subscription handle without cancelling it.
    pub fn release_subscription(&self) {
        self.inner.subscription.with_lock(Option::take);
    }
}

impl<T, E> Clone for TestConsumer<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Subscriber for TestConsumer<T, E>
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
        if self.inner.initial_demand.is_positive() {
            subscription.request(self.inner.initial_demand);
        }
    }

    fn receive(&self, input: T) -> Demand {
        if let Some(hook) = &self.inner.on_value {
            hook(&input);
        }
        let count = self.inner.events.with_lock(|events| {
            events.push(TestEvent::Value(input));
            events
                .iter()
                .filter(|event| matches!(event, TestEvent::Value(_)))
                .count()
        });
        match &self.inner.additional_demand {
            Some(policy) => policy(count),
            None => Demand::none(),
        }
    }

    fn receive_completion(&self, completion: Completion<E>) {
        self.inner
            .events
            .with_lock(|events| events.push(TestEvent::Completion(completion)));
    }
}
