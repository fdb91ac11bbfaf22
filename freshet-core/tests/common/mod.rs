#![allow(dead_code)]

use freshet_core::{
    AnySubscription, Completion, Demand, Guarded, Subscriber, Subscription,
};
use std::sync::Arc;
use std::time::Duration;

/// Everything a subscription delivered, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<T, E> {
    Value(T),
    Completion(Completion<E>),
}

struct RecorderInner<T, E> {
    events: Guarded<Vec<Event<T, E>>>,
    subscription: Guarded<Option<AnySubscription>>,
    initial_demand: Demand,
    demand_per_value: Demand,
}

/// A subscriber that records every delivery and hands out configurable
/// demand: `initial_demand` at subscribe time, `demand_per_value` returned
/// from each `receive`.
pub struct Recorder<T, E> {
    inner: Arc<RecorderInner<T, E>>,
}

impl<T, E> Recorder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn unlimited() -> Self {
        Self::with_demand(Demand::Unlimited, Demand::none())
    }

    pub fn with_demand(initial_demand: Demand, demand_per_value: Demand) -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                events: Guarded::new(Vec::new()),
                subscription: Guarded::new(None),
                initial_demand,
                demand_per_value,
            }),
        }
    }

    pub fn events(&self) -> Vec<Event<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        self.inner.events.cloned()
    }

    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.events.with_lock(|events| {
            events
                .iter()
                .filter_map(|event| match event {
                    Event::Value(value) => Some(value.clone()),
                    Event::Completion(_) => None,
                })
                .collect()
        })
    }

    pub fn completions(&self) -> Vec<Completion<E>> {
        self.inner.events.with_lock(|events| {
            let taken = std::mem::take(events);
            let mut completions = Vec::new();
            let mut remaining = Vec::new();
            for event in taken {
                match event {
                    Event::Completion(completion) => completions.push(completion),
                    other => remaining.push(other),
                }
            }
            *events = remaining;
            completions
        })
    }

    pub fn completion_count(&self) -> usize {
        self.inner.events.with_lock(|events| {
            events
                .iter()
                .filter(|event| matches!(event, Event::Completion(_)))
                .count()
        })
    }

    pub fn value_count(&self) -> usize {
        self.inner.events.with_lock(|events| {
            events
                .iter()
                .filter(|event| matches!(event, Event::Value(_)))
                .count()
        })
    }

    pub fn has_subscription(&self) -> bool {
        self.inner.subscription.with_lock(|slot| slot.is_some())
    }

    pub fn request(&self, demand: Demand) {
        let subscription = self.inner.subscription.cloned();
        if let Some(subscription) = subscription {
            subscription.request(demand);
        }
    }

    pub fn cancel(&self) {
        let subscription = self.inner.subscription.cloned();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    /// Drops the retained subscription handle without cancelling.
    pub fn release_subscription(&self) {
        self.inner.subscription.with_lock(Option::take);
    }
}

impl<T, E> Clone for Recorder<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Subscriber for Recorder<T, E>
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
        self.inner
            .events
            .with_lock(|events| events.push(Event::Value(input)));
        self.inner.demand_per_value
    }

    fn receive_completion(&self, completion: Completion<E>) {
        self.inner
            .events
            .with_lock(|events| events.push(Event::Completion(completion)));
    }
}

/// Polls `condition` until it holds or the timeout elapses.
pub async fn wait_until(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
