// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriber::Subscriber;

/// An entity that can establish a subscription with a subscriber and
/// subsequently push values to it.
///
/// Publishers are immutable descriptors: subscribing never mutates the
/// publisher, never fails synchronously, and may happen any number of times,
/// each call producing an independent subscription (the multicast
/// [`ReplaySubject`](crate::ReplaySubject) shares state across its
/// subscriptions by design).
///
/// No value or terminal signal reaches a subscriber before
/// [`receive_subscription`](Subscriber::receive_subscription) has handed it
/// the subscription.
pub trait Publisher {
    /// The type of values this publisher emits.
    type Output;
    /// The failure type of the terminal signal.
    type Failure;

    /// Attaches `subscriber`, handing it a subscription.
    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static;
}
