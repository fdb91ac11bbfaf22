// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::demand::Demand;
use std::sync::Arc;

/// The live handle coordinating demand and cancellation between one
/// publisher and one subscriber.
///
/// Implementations take `&self` and serialize their own state internally;
/// both operations may be called from any thread, concurrently with
/// delivery.
pub trait Subscription: Send + Sync {
    /// Grants additional units of demand. Demand is cumulative; a request
    /// of [`Demand::none()`] is a no-op.
    fn request(&self, demand: Demand);

    /// Stops delivery. Idempotent and safe to call concurrently with
    /// delivery: a delivery already in progress may complete, but no new
    /// delivery begins after `cancel` returns.
    fn cancel(&self);
}

/// A cloneable, type-erased handle to a [`Subscription`].
///
/// The subscription's resources live as long as at least one handle (or a
/// delivery in flight) does. Dropping the last handle without calling
/// [`cancel`](Subscription::cancel) releases them all the same: background
/// work stops and delivery silently ends. Retain the handle for as long as
/// values are wanted - forgetting to do so is the most common integration
/// mistake.
#[derive(Clone)]
pub struct AnySubscription {
    inner: Arc<dyn Subscription>,
}

impl AnySubscription {
    /// Erases a concrete subscription.
    pub fn new(subscription: impl Subscription + 'static) -> Self {
        Self {
            inner: Arc::new(subscription),
        }
    }

    /// Wraps an already shared subscription without another allocation.
    pub fn from_arc(subscription: Arc<dyn Subscription>) -> Self {
        Self {
            inner: subscription,
        }
    }
}

impl Subscription for AnySubscription {
    fn request(&self, demand: Demand) {
        self.inner.request(demand);
    }

    fn cancel(&self) {
        self.inner.cancel();
    }
}

impl core::fmt::Debug for AnySubscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnySubscription").finish_non_exhaustive()
    }
}
