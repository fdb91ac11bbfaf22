// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded-replay multicast subject.

use crate::completion::Completion;
use crate::demand::Demand;
use crate::lock::Guarded;
use crate::publisher::Publisher;
use crate::subscriber::{AnySubscriber, Subscriber};
use crate::subscription::{AnySubscription, Subscription};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

/// A multicast hub that replays the last `buffer_size` values to every new
/// subscriber and tracks each subscriber's demand independently.
///
/// `send` appends to the replay buffer (oldest values evicted first) and
/// forwards to every registered subscription. `send_completion` stores the
/// terminal signal, clears the registration table, and delivers the signal
/// to every previously registered subscription; a subscriber joining after
/// that receives the buffered replay followed by the stored terminal signal
/// and is never registered.
///
/// Values are forwarded to a subscription only while it has outstanding
/// demand; anything it cannot yet accept (replayed history included) is
/// queued and flushed as further `request` calls grant credit. For any one
/// subscription, replayed history and live sends are delivered strictly in
/// original emission order.
///
/// Cloning the subject is cheap; all clones share one buffer and
/// registration table.
///
/// ```
/// use freshet_core::ReplaySubject;
///
/// let subject = ReplaySubject::<i32, freshet_core::Never>::new(2);
/// for n in [1, 2, 3, 4] {
///     subject.send(n);
/// }
/// // A subscriber joining now is replayed exactly [3, 4].
/// ```
pub struct ReplaySubject<T, E> {
    core: Arc<SubjectCore<T, E>>,
}

impl<T, E> ReplaySubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a subject buffering the last `buffer_size` values.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            core: Arc::new(SubjectCore {
                buffer_size,
                state: Guarded::new(SubjectState {
                    buffer: VecDeque::new(),
                    completion: None,
                    subscriptions: Vec::new(),
                    upstreams: Vec::new(),
                    next_id: 0,
                }),
            }),
        }
    }

    /// Broadcasts a value to every registered subscription.
    ///
    /// A no-op once the subject has terminated.
    pub fn send(&self, value: T) {
        let targets = self.core.state.with_lock(|st| {
            if st.completion.is_some() {
                return None;
            }
            if self.core.buffer_size > 0 {
                st.buffer.push_back(value.clone());
                while st.buffer.len() > self.core.buffer_size {
                    st.buffer.pop_front();
                }
            }
            Some(st.subscriptions.clone())
        });
        // Deliver outside the subject lock: a subscriber may cancel (and
        // deregister) while handling the value.
        if let Some(targets) = targets {
            for subscription in &targets {
                subscription.enqueue(value.clone());
            }
        }
    }

    /// Terminates the subject, delivering `completion` to every registered
    /// subscription and storing it for late subscribers.
    ///
    /// A no-op if the subject has already terminated.
    pub fn send_completion(&self, completion: Completion<E>) {
        let cleared = self.core.state.with_lock(|st| {
            if st.completion.is_some() {
                return None;
            }
            st.completion = Some(completion.clone());
            Some((
                std::mem::take(&mut st.subscriptions),
                std::mem::take(&mut st.upstreams),
            ))
        });
        if let Some((targets, upstreams)) = cleared {
            tracing::debug!(subscribers = targets.len(), "replay subject terminated");
            for subscription in targets {
                subscription.terminate(completion.clone());
            }
            // Releasing the relay subscriptions outside the lock; a dropped
            // handle cancels its upstream.
            drop(upstreams);
        }
    }

    /// Returns `true` once a terminal signal has been sent.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.core.state.with_lock(|st| st.completion.is_some())
    }

    /// Number of currently registered subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.core.state.with_lock(|st| st.subscriptions.len())
    }
}

impl<T, E> Default for ReplaySubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// A subject with no replay (`buffer_size` 0).
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T, E> Clone for ReplaySubject<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T, E> Publisher for ReplaySubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);

        // Seed the replay and register atomically with respect to `send`,
        // so a live value can never be queued ahead of replayed history and
        // no value falls between the snapshot and registration.
        let subscription = self.core.state.with_lock(|st| {
            let id = st.next_id;
            st.next_id += 1;
            let subscription = Arc::new(ReplaySubscription {
                id,
                subject: Arc::downgrade(&self.core),
                state: Guarded::new(SubscriptionState {
                    downstream: Some(downstream.clone()),
                    demand: Demand::none(),
                    pending: st.buffer.iter().cloned().collect(),
                    completion: st.completion.clone(),
                    draining: false,
                    terminated: false,
                }),
            });
            if st.completion.is_none() {
                st.subscriptions.push(subscription.clone());
            }
            subscription
        });

        downstream.receive_subscription(AnySubscription::from_arc(subscription.clone()));
        // The subscriber usually requests demand while receiving its
        // subscription; if it did, replay has already begun. Drain again in
        // case it did not and a completion is the only thing pending.
        subscription.drain();
    }
}

struct SubjectState<T, E> {
    buffer: VecDeque<T>,
    completion: Option<Completion<E>>,
    subscriptions: Vec<Arc<ReplaySubscription<T, E>>>,
    /// Subscriptions this subject holds as a relay *consumer*. Retained so
    /// the upstream keeps producing; released when the subject terminates.
    upstreams: Vec<AnySubscription>,
    next_id: u64,
}

struct SubjectCore<T, E> {
    buffer_size: usize,
    state: Guarded<SubjectState<T, E>>,
}

struct SubscriptionState<T, E> {
    downstream: Option<AnySubscriber<T, E>>,
    demand: Demand,
    pending: VecDeque<T>,
    completion: Option<Completion<E>>,
    draining: bool,
    terminated: bool,
}

struct ReplaySubscription<T, E> {
    id: u64,
    subject: Weak<SubjectCore<T, E>>,
    state: Guarded<SubscriptionState<T, E>>,
}

enum Step<T, E> {
    Deliver(T, AnySubscriber<T, E>),
    Complete(Completion<E>, AnySubscriber<T, E>),
    Idle,
}

impl<T, E> ReplaySubscription<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn enqueue(&self, value: T) {
        let queued = self.state.with_lock(|s| {
            if s.terminated || s.downstream.is_none() {
                false
            } else {
                s.pending.push_back(value);
                true
            }
        });
        if queued {
            self.drain();
        }
    }

    fn terminate(&self, completion: Completion<E>) {
        let stored = self.state.with_lock(|s| {
            if s.terminated || s.completion.is_some() || s.downstream.is_none() {
                false
            } else {
                s.completion = Some(completion);
                true
            }
        });
        if stored {
            self.drain();
        }
    }

    /// Delivery trampoline. At most one thread drains at a time, so
    /// delivery for this subscription is strictly serialized; reentrant
    /// `request` calls from the subscriber land in state and are picked up
    /// by the active drainer.
    fn drain(&self) {
        loop {
            let step = self.state.with_lock(|s| {
                if s.draining || s.terminated {
                    return Step::Idle;
                }
                let Some(downstream) = s.downstream.clone() else {
                    return Step::Idle;
                };
                if s.demand.is_positive() {
                    if let Some(value) = s.pending.pop_front() {
                        s.demand = s.demand.decrement();
                        s.draining = true;
                        return Step::Deliver(value, downstream);
                    }
                }
                if s.pending.is_empty() {
                    if let Some(completion) = s.completion.take() {
                        s.terminated = true;
                        s.downstream = None;
                        return Step::Complete(completion, downstream);
                    }
                }
                Step::Idle
            });

            match step {
                Step::Deliver(value, downstream) => {
                    let extra = downstream.receive(value);
                    self.state.with_lock(|s| {
                        s.draining = false;
                        s.demand += extra;
                    });
                }
                Step::Complete(completion, downstream) => {
                    downstream.receive_completion(completion);
                    self.deregister();
                    return;
                }
                Step::Idle => return,
            }
        }
    }

    fn deregister(&self) {
        if let Some(subject) = self.subject.upgrade() {
            subject.state.with_lock(|st| {
                st.subscriptions.retain(|s| s.id != self.id);
            });
        }
    }
}

impl<T, E> Subscription for ReplaySubscription<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn request(&self, demand: Demand) {
        if demand.is_none() {
            return;
        }
        let granted = self.state.with_lock(|s| {
            if s.terminated {
                false
            } else {
                s.demand += demand;
                true
            }
        });
        if granted {
            self.drain();
        }
    }

    fn cancel(&self) {
        let cleaned = self.state.with_lock(|s| {
            if s.terminated {
                None
            } else {
                s.terminated = true;
                s.pending.clear();
                s.completion = None;
                s.downstream.take()
            }
        });
        if cleaned.is_some() {
            drop(cleaned);
            self.deregister();
        }
    }
}

/// The subject is itself a subscriber, so it can relay an upstream
/// publisher to all of its own subscribers. It requests unlimited demand
/// and forwards values and the terminal signal to `send`/`send_completion`.
impl<T, E> Subscriber for ReplaySubject<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&self, subscription: AnySubscription) {
        let retained = self.core.state.with_lock(|st| {
            if st.completion.is_some() {
                false
            } else {
                st.upstreams.push(subscription.clone());
                true
            }
        });
        if retained {
            subscription.request(Demand::Unlimited);
        } else {
            subscription.cancel();
        }
    }

    fn receive(&self, input: T) -> Demand {
        self.send(input);
        Demand::Unlimited
    }

    fn receive_completion(&self, completion: Completion<E>) {
        self.send_completion(completion);
    }
}
